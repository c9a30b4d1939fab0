//! Mock log and catalog services for testing.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::interfaces::log_reader::Result;
use crate::interfaces::{
    AppendWrite, CatalogWriter, LogReadError, LogReader, OperationResult, ReadAllForward,
    ReadAllResult, WriteCompleted,
};
use crate::position::Position;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Log reader that replays scripted responses.
///
/// Once the script runs out every read returns an empty page at the
/// requested position.
#[derive(Default)]
pub struct MockLogReader {
    script: Mutex<VecDeque<Result<ReadAllResult>>>,
    requests: Mutex<Vec<ReadAllForward>>,
}

impl MockLogReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_result(&self, result: ReadAllResult) {
        lock(&self.script).push_back(Ok(result));
    }

    pub fn push_error(&self, error: LogReadError) {
        lock(&self.script).push_back(Err(error));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ReadAllForward> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl LogReader for MockLogReader {
    async fn read_all_forward(&self, request: ReadAllForward) -> Result<ReadAllResult> {
        lock(&self.requests).push(request.clone());
        match lock(&self.script).pop_front() {
            Some(Ok(mut result)) => {
                result.correlation_id = request.correlation_id;
                Ok(result)
            }
            Some(Err(e)) => Err(e),
            None => Ok(ReadAllResult {
                correlation_id: request.correlation_id,
                records: vec![],
                next_position: Position::new(request.commit_position, request.prepare_position),
                tail_position: 0,
            }),
        }
    }
}

/// Catalog writer that answers with scripted operation results.
///
/// Writes succeed once the script runs out.
#[derive(Default)]
pub struct MockCatalogWriter {
    script: Mutex<VecDeque<OperationResult>>,
    writes: Mutex<Vec<AppendWrite>>,
    fail_always: Mutex<Option<OperationResult>>,
}

impl MockCatalogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next unanswered write with `result`.
    pub fn push_result(&self, result: OperationResult) {
        lock(&self.script).push_back(result);
    }

    /// Answer every write with `result`, after any scripted ones.
    pub fn set_fail_always(&self, result: OperationResult) {
        *lock(&self.fail_always) = Some(result);
    }

    pub fn writes(&self) -> Vec<AppendWrite> {
        lock(&self.writes).clone()
    }

    pub fn write_count(&self) -> usize {
        lock(&self.writes).len()
    }
}

#[async_trait]
impl CatalogWriter for MockCatalogWriter {
    async fn append(&self, write: AppendWrite) -> WriteCompleted {
        let correlation_id = write.correlation_id;
        let number = lock(&self.writes).len() as i64;
        lock(&self.writes).push(write);

        let result = lock(&self.script)
            .pop_front()
            .or(*lock(&self.fail_always))
            .unwrap_or(OperationResult::Success);
        if result.is_success() {
            WriteCompleted::success(correlation_id, number)
        } else {
            WriteCompleted::failed(correlation_id, result, format!("scripted {}", result))
        }
    }
}
