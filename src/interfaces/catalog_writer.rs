//! Catalog write service interface.

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

/// Expected version of the target stream for an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Append regardless of the stream's current version.
    Any,
    /// The stream must not exist yet.
    NoStream,
    /// The stream's last event number must equal this value.
    Exact(i64),
}

/// An event to append.
#[derive(Debug, Clone, PartialEq)]
pub struct EventData {
    pub event_id: Uuid,
    pub event_type: String,
    pub is_json: bool,
    pub data: Vec<u8>,
    pub metadata: Vec<u8>,
}

/// Append request against a single stream.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendWrite {
    /// Identifies this attempt. Every reissue gets a fresh one.
    pub correlation_id: Uuid,
    pub event_stream_id: String,
    pub expected_version: ExpectedVersion,
    pub events: Vec<EventData>,
}

/// Outcome of an append as reported by the write service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    Success,
    PrepareTimeout,
    CommitTimeout,
    ForwardTimeout,
    WrongExpectedVersion,
    StreamDeleted,
    InvalidTransaction,
    AccessDenied,
}

impl OperationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success)
    }

    /// Timeout-like failures that may succeed when the write is reissued.
    ///
    /// Integrity and authorization failures never do.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OperationResult::PrepareTimeout
                | OperationResult::CommitTimeout
                | OperationResult::ForwardTimeout
        )
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationResult::Success => "Success",
            OperationResult::PrepareTimeout => "PrepareTimeout",
            OperationResult::CommitTimeout => "CommitTimeout",
            OperationResult::ForwardTimeout => "ForwardTimeout",
            OperationResult::WrongExpectedVersion => "WrongExpectedVersion",
            OperationResult::StreamDeleted => "StreamDeleted",
            OperationResult::InvalidTransaction => "InvalidTransaction",
            OperationResult::AccessDenied => "AccessDenied",
        };
        f.write_str(name)
    }
}

/// Completion of an [`AppendWrite`].
#[derive(Debug, Clone, PartialEq)]
pub struct WriteCompleted {
    pub correlation_id: Uuid,
    pub result: OperationResult,
    pub message: String,
    /// Number assigned to the first appended event, or -1 on failure.
    pub first_event_number: i64,
}

impl WriteCompleted {
    pub fn success(correlation_id: Uuid, first_event_number: i64) -> Self {
        Self {
            correlation_id,
            result: OperationResult::Success,
            message: String::new(),
            first_event_number,
        }
    }

    pub fn failed(correlation_id: Uuid, result: OperationResult, message: impl Into<String>) -> Self {
        Self {
            correlation_id,
            result,
            message: message.into(),
            first_event_number: -1,
        }
    }
}

/// Interface for control-plane appends to catalog streams.
///
/// # Implementations
///
/// - `InMemoryTransactionLog`: appends into the in-process log
/// - `MockCatalogWriter`: scripted outcomes for tests
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    /// Append events; every failure is reported through the completion.
    async fn append(&self, write: AppendWrite) -> WriteCompleted;
}
