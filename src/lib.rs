//! Logfeed - ordered event distribution from an append-only transaction log.
//!
//! Streams committed records, in commit order, from the global transaction
//! log to downstream consumers, and registers projections in the catalog
//! stream with bounded retries.

pub mod bus;
pub mod config;
pub mod distribution;
pub mod interfaces;
pub mod position;
pub mod registration;
pub mod storage;
pub mod utils;

pub use position::Position;
