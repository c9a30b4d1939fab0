//! Log read service interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::position::Position;

/// Result type for log reads.
pub type Result<T> = std::result::Result<T, LogReadError>;

/// Errors surfaced by the log read service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LogReadError {
    #[error("Log unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid read position {0}")]
    InvalidPosition(Position),
}

/// Flags stored with a prepare record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PrepareFlags(u16);

impl PrepareFlags {
    pub const NONE: PrepareFlags = PrepareFlags(0);
    pub const DATA: PrepareFlags = PrepareFlags(0x01);
    pub const TRANSACTION_BEGIN: PrepareFlags = PrepareFlags(0x02);
    pub const TRANSACTION_END: PrepareFlags = PrepareFlags(0x04);
    pub const IS_COMMITTED: PrepareFlags = PrepareFlags(0x20);
    pub const IS_JSON: PrepareFlags = PrepareFlags(0x100);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u16 {
        self.0
    }

    pub const fn contains(&self, other: PrepareFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for PrepareFlags {
    type Output = PrepareFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        PrepareFlags(self.0 | rhs.0)
    }
}

/// A raw event as stored in the log.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Number of the event within its stream.
    pub event_number: i64,
    /// Physical offset of the prepare record.
    pub log_position: i64,
    pub event_id: Uuid,
    pub event_stream_id: String,
    pub event_type: String,
    pub flags: PrepareFlags,
    pub data: Vec<u8>,
    pub metadata: Vec<u8>,
    pub timestamp: DateTime<Utc>,
}

impl EventRecord {
    pub fn is_json(&self) -> bool {
        self.flags.contains(PrepareFlags::IS_JSON)
    }
}

/// A committed log entry, with its link target resolved.
///
/// When the entry stored in the log is a link, `link` holds that link record
/// and `event` holds the record it points to. Otherwise `link` is `None` and
/// `event` is the stored record itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEventRecord {
    pub event: EventRecord,
    pub link: Option<EventRecord>,
    /// Offset of the commit record of the transaction that wrote the entry.
    pub commit_position: i64,
}

impl ResolvedEventRecord {
    /// The record physically present in the log at this position.
    pub fn position_record(&self) -> &EventRecord {
        self.link.as_ref().unwrap_or(&self.event)
    }

    /// Position of the entry in the global log.
    pub fn position(&self) -> Position {
        Position::new(self.commit_position, self.position_record().log_position)
    }
}

/// Forward range read over the global log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadAllForward {
    pub correlation_id: Uuid,
    pub commit_position: i64,
    pub prepare_position: i64,
    pub max_count: usize,
    pub resolve_links: bool,
}

/// Reply to a [`ReadAllForward`] request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadAllResult {
    pub correlation_id: Uuid,
    /// Records in ascending commit order.
    pub records: Vec<ResolvedEventRecord>,
    /// Where to resume reading without gaps or duplicates.
    pub next_position: Position,
    /// Physical end of the log at the time of the read.
    pub tail_position: i64,
}

/// Interface to the global transaction log.
///
/// # Implementations
///
/// - `InMemoryTransactionLog`: in-process log for tests and the demo binary
/// - `MockLogReader`: scripted replies for tests
#[async_trait]
pub trait LogReader: Send + Sync {
    /// Read up to `request.max_count` records at or after the requested position.
    async fn read_all_forward(&self, request: ReadAllForward) -> Result<ReadAllResult>;
}
