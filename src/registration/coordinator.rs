//! Bounded-retry registration state machine.
//!
//! The coordinator never talks to the catalog itself. [`start`] hands out the
//! first write and every [`handle`] call turns a completion into the next
//! step: reissue, resolve, or ignore. At most one write is outstanding, and
//! only the completion carrying its correlation id is acted on.
//!
//! [`start`]: RegistrationCoordinator::start
//! [`handle`]: RegistrationCoordinator::handle

use tracing::{debug, warn};
use uuid::Uuid;

use super::config::RegistrationConfig;
use super::types::{
    ProjectionRegistration, RegistrationError, RegistrationOutcome, Result,
};
use crate::interfaces::{AppendWrite, EventData, ExpectedVersion, WriteCompleted};

/// What the driver does after a completion.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationStep {
    /// Issue this write; the previous attempt is discarded.
    Retry(AppendWrite),
    /// Terminal. The coordinator accepts no further writes.
    Resolved(RegistrationOutcome),
    /// The completion did not belong to the outstanding write.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Awaiting(Uuid),
    Resolved,
}

/// Drives one registration to exactly one terminal outcome.
#[derive(Debug)]
pub struct RegistrationCoordinator {
    name: String,
    catalog_stream: String,
    event: EventData,
    max_attempts: u32,
    attempts: u32,
    phase: Phase,
}

impl RegistrationCoordinator {
    pub fn new(registration: &ProjectionRegistration, config: &RegistrationConfig) -> Result<Self> {
        if config.max_attempts == 0 {
            return Err(RegistrationError::NoAttempts);
        }
        Ok(Self {
            name: registration.name.clone(),
            catalog_stream: config.catalog_stream.clone(),
            event: registration.to_event_data()?,
            max_attempts: config.max_attempts,
            attempts: 0,
            phase: Phase::Idle,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Writes issued so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_resolved(&self) -> bool {
        self.phase == Phase::Resolved
    }

    /// Produce the first write.
    pub fn start(&mut self) -> Result<AppendWrite> {
        match self.phase {
            Phase::Idle => Ok(self.issue()),
            Phase::Awaiting(_) => Err(RegistrationError::AlreadyStarted),
            Phase::Resolved => Err(RegistrationError::AlreadyResolved),
        }
    }

    /// Apply the completion of a write.
    pub fn handle(&mut self, completed: WriteCompleted) -> Result<RegistrationStep> {
        let outstanding = match self.phase {
            Phase::Idle => return Err(RegistrationError::NotStarted),
            Phase::Resolved => return Ok(RegistrationStep::Stale),
            Phase::Awaiting(id) => id,
        };
        if completed.correlation_id != outstanding {
            debug!(
                projection = %self.name,
                correlation_id = %completed.correlation_id,
                "Ignoring stale registration completion"
            );
            return Ok(RegistrationStep::Stale);
        }

        if completed.result.is_success() {
            self.phase = Phase::Resolved;
            debug!(
                projection = %self.name,
                attempts = self.attempts,
                event_number = completed.first_event_number,
                "Projection registered"
            );
            return Ok(RegistrationStep::Resolved(RegistrationOutcome::Registered {
                name: self.name.clone(),
                event_number: completed.first_event_number,
                attempts: self.attempts,
            }));
        }

        if completed.result.is_transient() && self.attempts < self.max_attempts {
            warn!(
                projection = %self.name,
                attempt = self.attempts,
                max_attempts = self.max_attempts,
                result = %completed.result,
                "Registration write failed transiently, reissuing"
            );
            return Ok(RegistrationStep::Retry(self.issue()));
        }

        self.phase = Phase::Resolved;
        warn!(
            projection = %self.name,
            attempts = self.attempts,
            result = %completed.result,
            message = %completed.message,
            "Registration failed"
        );
        Ok(RegistrationStep::Resolved(
            RegistrationOutcome::RegistrationFailed {
                name: self.name.clone(),
                reason: completed.result,
                message: completed.message,
                attempts: self.attempts,
            },
        ))
    }

    fn issue(&mut self) -> AppendWrite {
        let correlation_id = Uuid::new_v4();
        self.attempts += 1;
        self.phase = Phase::Awaiting(correlation_id);
        AppendWrite {
            correlation_id,
            event_stream_id: self.catalog_stream.clone(),
            expected_version: ExpectedVersion::Any,
            events: vec![self.event.clone()],
        }
    }
}
