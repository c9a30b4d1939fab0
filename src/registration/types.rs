//! Registration payload, outcomes, and errors.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interfaces::{EventData, OperationResult};

/// Event type of a projection's catalog entry.
pub const PROJECTION_CREATED: &str = "$ProjectionCreated";

/// How long a projection lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    Transient,
    OneTime,
    Continuous,
}

/// Identity a projection runs under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAs {
    System,
    User(String),
}

/// Catalog entry for a new projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRegistration {
    pub name: String,
    pub mode: ProjectionMode,
    pub handler_type: String,
    pub query: String,
    pub run_as: RunAs,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub checkpoints_enabled: bool,
    #[serde(default)]
    pub emit_enabled: bool,
    #[serde(default)]
    pub track_emitted_streams: bool,
}

fn default_true() -> bool {
    true
}

impl ProjectionRegistration {
    /// A continuous, enabled projection with checkpoints, run as the system.
    pub fn continuous(
        name: impl Into<String>,
        handler_type: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mode: ProjectionMode::Continuous,
            handler_type: handler_type.into(),
            query: query.into(),
            run_as: RunAs::System,
            enabled: true,
            checkpoints_enabled: true,
            emit_enabled: false,
            track_emitted_streams: false,
        }
    }

    pub fn with_run_as(mut self, run_as: RunAs) -> Self {
        self.run_as = run_as;
        self
    }

    pub fn with_emit(mut self, emit_enabled: bool) -> Self {
        self.emit_enabled = emit_enabled;
        self
    }

    /// Serialize into the catalog event. The event id is fresh on every call.
    pub fn to_event_data(&self) -> Result<EventData> {
        let data = serde_json::to_vec(self)
            .map_err(|e| RegistrationError::Serialization(e.to_string()))?;
        Ok(EventData {
            event_id: Uuid::new_v4(),
            event_type: PROJECTION_CREATED.to_string(),
            is_json: true,
            data,
            metadata: vec![],
        })
    }
}

/// Terminal result of a registration.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    Registered {
        name: String,
        /// Number of the catalog event that recorded the registration.
        event_number: i64,
        attempts: u32,
    },
    RegistrationFailed {
        name: String,
        reason: OperationResult,
        message: String,
        attempts: u32,
    },
}

impl RegistrationOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, RegistrationOutcome::Registered { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            RegistrationOutcome::Registered { attempts, .. }
            | RegistrationOutcome::RegistrationFailed { attempts, .. } => *attempts,
        }
    }
}

/// Result type for registration operations.
pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Caller misuse and setup failures. Operational write failures are reported
/// as [`RegistrationOutcome::RegistrationFailed`], not as errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    #[error("max_attempts must be at least 1")]
    NoAttempts,

    #[error("Registration already started")]
    AlreadyStarted,

    #[error("Registration not started")]
    NotStarted,

    #[error("Registration already resolved")]
    AlreadyResolved,

    #[error("Catalog writer did not answer write {0}")]
    UnmatchedCompletion(Uuid),

    #[error("Failed to serialize registration: {0}")]
    Serialization(String),
}
