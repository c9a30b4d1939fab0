//! Event distribution from the global transaction log.
//!
//! This module contains:
//! - `LogCursor` trait: pause/resume/dispose contract driven by `CursorEvent`s
//! - `TransactionLogDistributor`: cursor over the global log (pure state machine)
//! - `DistributionPoint`: tokio driver that executes a cursor's actions
//! - Distribution messages and errors

pub mod config;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod messages;
pub mod transaction_log;

pub use config::DistributionConfig;
pub use cursor::{CursorAction, CursorEvent, CursorState, LogCursor};
pub use driver::{DistributionHandle, DistributionPoint};
pub use error::{DistributionError, InvalidState, Result};
pub use messages::{CommittedEventDistributed, DistributionMessage, EndOfLogMarker, Event};
pub use transaction_log::TransactionLogDistributor;
