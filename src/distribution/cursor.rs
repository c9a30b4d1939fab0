//! Log cursor contract.
//!
//! A cursor is a pure state machine: every inbound [`CursorEvent`] is applied
//! by a single transition function that returns the [`CursorAction`]s its
//! driver must carry out. The cursor never performs I/O itself, so a read it
//! asks for cannot be cancelled; pausing while a read is outstanding is
//! therefore a two-step affair (`PauseRequested`, then `Paused` once the
//! completion arrives).

use std::time::Duration;

use uuid::Uuid;

use super::error::Result;
use super::messages::DistributionMessage;
use crate::interfaces::{ReadAllForward, ReadAllResult};
use crate::position::Position;

/// Flow-control state of a cursor.
///
/// Combined with the cursor's read-in-flight flag:
/// - `Paused` never has a read in flight.
/// - `PauseRequested` always has one; the pause lands when it completes.
/// - `Running` may or may not have one (none while a tick is pending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Paused,
    PauseRequested,
    Running,
}

/// Inbound events processed by a cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorEvent {
    Resume,
    Pause,
    ReadCompleted(ReadAllResult),
    /// Self-scheduled continuation.
    Tick,
}

/// Work the driver performs on behalf of a cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorAction {
    /// Hand a message to the publisher.
    Emit(DistributionMessage),
    /// Issue a read now.
    Read(ReadAllForward),
    /// Issue a read once `delay` has elapsed.
    ScheduleRead {
        delay: Duration,
        request: ReadAllForward,
    },
    /// Feed a [`CursorEvent::Tick`] back with no delay.
    ScheduleTick,
}

/// Pause/resume/dispose lifecycle shared by event distributors.
pub trait LogCursor: Send {
    /// Identifies this cursor on every request and message it produces.
    fn correlation_id(&self) -> Uuid;

    /// Apply one event and return the actions it produces.
    fn handle(&mut self, event: CursorEvent) -> Result<Vec<CursorAction>>;

    /// Terminate all future activity. Idempotent.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;

    /// Position the next read starts from.
    fn position(&self) -> Position;

    fn resume(&mut self) -> Result<Vec<CursorAction>> {
        self.handle(CursorEvent::Resume)
    }

    fn pause(&mut self) -> Result<Vec<CursorAction>> {
        self.handle(CursorEvent::Pause)
    }
}
