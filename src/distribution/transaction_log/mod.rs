//! Transaction-log-backed event distributor.
//!
//! Streams every committed record at or after a starting position, in commit
//! order, with at most one read outstanding at a time. After a read that
//! returned data the next read is requested immediately (through a tick);
//! after an empty read it is requested after the idle poll delay.

use tracing::{debug, error, trace};
use uuid::Uuid;

use super::config::DistributionConfig;
use super::cursor::{CursorAction, CursorEvent, CursorState, LogCursor};
use super::error::{DistributionError, InvalidState, Result};
use super::messages::{CommittedEventDistributed, DistributionMessage, EndOfLogMarker, Event};
use crate::interfaces::{ReadAllForward, ReadAllResult, ResolvedEventRecord};
use crate::position::{progress_percent, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Active,
    Disposed,
    Faulted,
}

/// Cursor over the global transaction log.
#[derive(Debug)]
pub struct TransactionLogDistributor {
    correlation_id: Uuid,
    config: DistributionConfig,
    from: Position,
    state: CursorState,
    read_in_flight: bool,
    lifecycle: Lifecycle,
}

impl TransactionLogDistributor {
    /// Create a distributor that starts fully paused at `from`.
    pub fn new(correlation_id: Uuid, from: Position, config: DistributionConfig) -> Self {
        Self {
            correlation_id,
            config,
            from,
            state: CursorState::Paused,
            read_in_flight: false,
            lifecycle: Lifecycle::Active,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn read_in_flight(&self) -> bool {
        self.read_in_flight
    }

    pub fn is_faulted(&self) -> bool {
        self.lifecycle == Lifecycle::Faulted
    }

    fn ensure_active(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Active => Ok(()),
            Lifecycle::Disposed => Err(InvalidState::Disposed.into()),
            Lifecycle::Faulted => Err(InvalidState::Faulted.into()),
        }
    }

    fn check_invariants(&self) {
        debug_assert!(
            !(self.state == CursorState::Paused && self.read_in_flight),
            "paused with a read in flight"
        );
        debug_assert!(
            !(self.state == CursorState::PauseRequested && !self.read_in_flight),
            "pause requested with no read in flight"
        );
    }

    fn on_resume(&mut self) -> Result<Vec<CursorAction>> {
        self.ensure_active()?;
        match self.state {
            CursorState::Running => Err(InvalidState::NotPaused.into()),
            CursorState::PauseRequested => {
                // The outstanding read keeps driving the cursor.
                self.state = CursorState::Running;
                trace!(
                    distributor = %self.correlation_id,
                    position = %self.from,
                    "Pause request cancelled"
                );
                Ok(Vec::new())
            }
            CursorState::Paused => {
                self.state = CursorState::Running;
                trace!(
                    distributor = %self.correlation_id,
                    position = %self.from,
                    "Resuming event distribution"
                );
                Ok(vec![self.request_events(false)?])
            }
        }
    }

    fn on_pause(&mut self) -> Result<Vec<CursorAction>> {
        self.ensure_active()?;
        if self.state != CursorState::Running {
            return Err(InvalidState::PauseAlreadyRequested.into());
        }
        self.state = if self.read_in_flight {
            CursorState::PauseRequested
        } else {
            CursorState::Paused
        };
        trace!(
            distributor = %self.correlation_id,
            position = %self.from,
            state = ?self.state,
            "Pausing event distribution"
        );
        Ok(Vec::new())
    }

    fn on_read_completed(&mut self, result: ReadAllResult) -> Result<Vec<CursorAction>> {
        match self.lifecycle {
            Lifecycle::Disposed => return Ok(Vec::new()),
            Lifecycle::Faulted => return Err(InvalidState::Faulted.into()),
            Lifecycle::Active => {}
        }
        if !self.read_in_flight {
            return Err(InvalidState::ReadNotRequested.into());
        }
        if self.state == CursorState::Paused {
            return Err(InvalidState::CompletionWhilePaused.into());
        }
        self.read_in_flight = false;

        let drained = result.records.is_empty();
        let mut actions = if drained {
            debug!(
                distributor = %self.correlation_id,
                position = %self.from,
                "Caught up with the log tail"
            );
            self.deliver_end_of_log()
        } else {
            match self.deliver_batch(&result) {
                Ok(actions) => actions,
                Err(e) => {
                    self.lifecycle = Lifecycle::Faulted;
                    self.state = CursorState::Paused;
                    error!(distributor = %self.correlation_id, error = %e, "Distribution halted");
                    return Err(e);
                }
            }
        };

        if self.state == CursorState::PauseRequested {
            self.state = CursorState::Paused;
        } else if drained {
            actions.push(self.request_events(true)?);
        } else {
            actions.push(CursorAction::ScheduleTick);
        }
        Ok(actions)
    }

    fn on_tick(&mut self) -> Result<Vec<CursorAction>> {
        // A tick scheduled before a pause/resume pair may arrive after the
        // resume already issued a read; it is then stale.
        if self.lifecycle != Lifecycle::Active
            || self.state != CursorState::Running
            || self.read_in_flight
        {
            return Ok(Vec::new());
        }
        Ok(vec![self.request_events(false)?])
    }

    fn request_events(&mut self, delay: bool) -> Result<CursorAction> {
        self.ensure_active()?;
        if self.read_in_flight {
            return Err(InvalidState::ReadInProgress.into());
        }
        if self.state != CursorState::Running {
            return Err(InvalidState::PausedOrPauseRequested.into());
        }
        self.read_in_flight = true;

        let (commit_position, prepare_position) = self.from.read_start();
        let request = ReadAllForward {
            correlation_id: self.correlation_id,
            commit_position,
            prepare_position,
            max_count: self.config.max_read_count,
            resolve_links: true,
        };
        if delay {
            Ok(CursorAction::ScheduleRead {
                delay: self.config.idle_poll_delay(),
                request,
            })
        } else {
            Ok(CursorAction::Read(request))
        }
    }

    fn deliver_end_of_log(&self) -> Vec<CursorAction> {
        if !self.config.deliver_end_of_log {
            return Vec::new();
        }
        vec![CursorAction::Emit(DistributionMessage::EndOfLog(
            EndOfLogMarker {
                correlation_id: self.correlation_id,
                position: self.from,
                safe_join_position: self.from.prepare,
                progress: 100.0,
            },
        ))]
    }

    /// Translate a whole batch, then advance. Nothing is emitted if any
    /// record is out of order.
    fn deliver_batch(&mut self, result: &ReadAllResult) -> Result<Vec<CursorAction>> {
        let mut last = self.from;
        let mut actions = Vec::with_capacity(result.records.len() + 1);
        for record in &result.records {
            let received = record.position();
            if received < last {
                return Err(DistributionError::OutOfOrder { last, received });
            }
            last = received;
            actions.push(CursorAction::Emit(DistributionMessage::Committed(
                self.translate(record, received, result.tail_position),
            )));
        }
        if result.next_position < last {
            return Err(DistributionError::OutOfOrder {
                last,
                received: result.next_position,
            });
        }

        debug!(
            distributor = %self.correlation_id,
            count = result.records.len(),
            from = %self.from,
            next = %result.next_position,
            "Distributed events"
        );
        self.from = result.next_position;
        Ok(actions)
    }

    fn translate(
        &self,
        record: &ResolvedEventRecord,
        position: Position,
        tail_position: i64,
    ) -> CommittedEventDistributed {
        let position_record = record.position_record();
        let event = &record.event;
        CommittedEventDistributed {
            correlation_id: self.correlation_id,
            position,
            event_stream_id: position_record.event_stream_id.clone(),
            event_number: position_record.event_number,
            origin_stream_id: event.event_stream_id.clone(),
            origin_event_number: event.event_number,
            is_link: record.link.is_some(),
            event: Event {
                event_id: event.event_id,
                event_type: event.event_type.clone(),
                is_json: event.is_json(),
                data: event.data.clone(),
                metadata: event.metadata.clone(),
            },
            safe_join_position: position.prepare,
            progress: progress_percent(
                position_record.log_position,
                tail_position,
                self.config.unknown_tail_progress,
            ),
        }
    }
}

impl LogCursor for TransactionLogDistributor {
    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn handle(&mut self, event: CursorEvent) -> Result<Vec<CursorAction>> {
        let actions = match event {
            CursorEvent::Resume => self.on_resume(),
            CursorEvent::Pause => self.on_pause(),
            CursorEvent::ReadCompleted(result) => self.on_read_completed(result),
            CursorEvent::Tick => self.on_tick(),
        };
        self.check_invariants();
        actions
    }

    fn dispose(&mut self) {
        self.lifecycle = Lifecycle::Disposed;
    }

    fn is_disposed(&self) -> bool {
        self.lifecycle == Lifecycle::Disposed
    }

    fn position(&self) -> Position {
        self.from
    }
}
