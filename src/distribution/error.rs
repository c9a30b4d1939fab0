//! Distribution errors.

use crate::interfaces::LogReadError;
use crate::position::Position;

/// Result type for cursor operations.
pub type Result<T> = std::result::Result<T, DistributionError>;

/// Protocol misuse between a cursor and its driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidState {
    #[error("Disposed")]
    Disposed,

    #[error("Halted after an ordering violation")]
    Faulted,

    #[error("Is not paused")]
    NotPaused,

    #[error("Pause has been already requested")]
    PauseAlreadyRequested,

    #[error("Read events has not been requested")]
    ReadNotRequested,

    #[error("Read completed while paused")]
    CompletionWhilePaused,

    #[error("Read operation is already in progress")]
    ReadInProgress,

    #[error("Paused or pause requested")]
    PausedOrPauseRequested,
}

/// Errors raised by an event distributor.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DistributionError {
    #[error("Invalid cursor state: {0}")]
    InvalidState(#[from] InvalidState),

    #[error(
        "Log returned events in incorrect order. Last known position is: {last}. Received position is: {received}"
    )]
    OutOfOrder { last: Position, received: Position },

    #[error("Log read failed: {0}")]
    Read(#[from] LogReadError),

    #[error("Distributor task stopped")]
    Stopped,
}

impl DistributionError {
    /// Whether the error halts the cursor rather than rejecting one call.
    ///
    /// Resume/pause misuse is reported to the caller and the cursor keeps
    /// running; everything on the completion side is fatal.
    pub fn is_fatal(&self) -> bool {
        match self {
            DistributionError::InvalidState(state) => matches!(
                state,
                InvalidState::ReadNotRequested
                    | InvalidState::CompletionWhilePaused
                    | InvalidState::ReadInProgress
                    | InvalidState::PausedOrPauseRequested
            ),
            DistributionError::OutOfOrder { .. } | DistributionError::Read(_) => true,
            DistributionError::Stopped => false,
        }
    }
}
