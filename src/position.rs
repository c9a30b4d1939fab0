//! Positions in the global transaction log.
//!
//! A [`Position`] is the `(commit, prepare)` offset pair that locates a record
//! in the append-only log. Commit offsets order transactions; prepare offsets
//! order records within a transaction.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Prepare offset meaning "from the start of the transaction at `commit`".
pub const UNSET_PREPARE: i64 = -1;

/// Location of a record in the global commit log.
///
/// Ordered by `commit`, then by `prepare`. Field order matters: the derived
/// `Ord` is lexicographic over the declaration order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// Offset of the transaction's commit record.
    pub commit: i64,
    /// Offset of the record within the transaction.
    pub prepare: i64,
}

impl Position {
    /// Position before any record in the log.
    pub const START: Position = Position {
        commit: 0,
        prepare: UNSET_PREPARE,
    };

    pub const fn new(commit: i64, prepare: i64) -> Self {
        Self { commit, prepare }
    }

    /// Offsets to send to the log when reading forward from this position.
    ///
    /// An unset prepare offset starts at the commit offset.
    pub fn read_start(&self) -> (i64, i64) {
        let prepare = if self.prepare == UNSET_PREPARE {
            self.commit
        } else {
            self.prepare
        };
        (self.commit, prepare)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C:{}/P:{}", self.commit, self.prepare)
    }
}

/// Three-way comparison using the two-field total order.
pub fn compare(a: &Position, b: &Position) -> Ordering {
    a.cmp(b)
}

/// Advisory progress estimate in percent.
///
/// `100 * log_position / tail_position`, clamped to `[0, 100]`. When the tail
/// is unknown (zero or negative) `unknown_tail` is returned instead.
pub fn progress_percent(log_position: i64, tail_position: i64, unknown_tail: f32) -> f32 {
    if tail_position <= 0 {
        return unknown_tail;
    }
    let percent = 100.0 * log_position as f64 / tail_position as f64;
    percent.clamp(0.0, 100.0) as f32
}
