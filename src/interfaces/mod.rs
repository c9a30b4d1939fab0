//! Abstract interfaces for logfeed's collaborators.
//!
//! These traits define the contracts for:
//! - Reading the global transaction log (paged, forward)
//! - Publishing distribution notifications (fire-and-forget)
//! - Appending control-plane records to catalog streams

pub mod catalog_writer;
pub mod log_reader;
pub mod publisher;

pub use catalog_writer::{
    AppendWrite, CatalogWriter, EventData, ExpectedVersion, OperationResult, WriteCompleted,
};
pub use log_reader::{
    EventRecord, LogReadError, LogReader, PrepareFlags, ReadAllForward, ReadAllResult,
    ResolvedEventRecord,
};
pub use publisher::DistributionPublisher;
