//! In-memory transaction log.
//!
//! Lays records out the way the durable log does: every event of a write is a
//! prepare record at its own offset, followed by one commit record. All events
//! of a write share the commit offset, so `(commit, prepare)` orders them.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::interfaces::log_reader::Result;
use crate::interfaces::{
    AppendWrite, CatalogWriter, EventData, EventRecord, ExpectedVersion, LogReadError, LogReader,
    OperationResult, PrepareFlags, ReadAllForward, ReadAllResult, ResolvedEventRecord,
    WriteCompleted,
};
use crate::position::Position;

/// Event type of link records.
pub const LINK_EVENT_TYPE: &str = "$>";

/// Bytes a prepare record occupies besides its data and metadata.
const PREPARE_HEADER_BYTES: i64 = 64;

/// Bytes a commit record occupies.
const COMMIT_RECORD_BYTES: i64 = 32;

struct StoredRecord {
    record: EventRecord,
    commit_position: i64,
}

impl StoredRecord {
    fn position(&self) -> Position {
        Position::new(self.commit_position, self.record.log_position)
    }
}

#[derive(Default)]
struct LogState {
    records: Vec<StoredRecord>,
    by_stream: HashMap<(String, i64), usize>,
    last_event_numbers: HashMap<String, i64>,
    next_offset: i64,
}

impl LogState {
    fn resolve(&self, stored: &StoredRecord, resolve_links: bool) -> ResolvedEventRecord {
        let target = resolve_links
            .then(|| parse_link(&stored.record))
            .flatten()
            .and_then(|key| self.by_stream.get(&key))
            .map(|&index| &self.records[index].record);

        match target {
            Some(event) => ResolvedEventRecord {
                event: event.clone(),
                link: Some(stored.record.clone()),
                commit_position: stored.commit_position,
            },
            None => ResolvedEventRecord {
                event: stored.record.clone(),
                link: None,
                commit_position: stored.commit_position,
            },
        }
    }
}

/// Parse `"<number>@<stream>"` out of a link record.
fn parse_link(record: &EventRecord) -> Option<(String, i64)> {
    if record.event_type != LINK_EVENT_TYPE {
        return None;
    }
    let text = std::str::from_utf8(&record.data).ok()?;
    let (number, stream) = text.split_once('@')?;
    Some((stream.to_string(), number.trim().parse().ok()?))
}

/// Build a link event pointing at `event_number` in `stream`.
pub fn link_to(stream: &str, event_number: i64) -> EventData {
    EventData {
        event_id: Uuid::new_v4(),
        event_type: LINK_EVENT_TYPE.to_string(),
        is_json: false,
        data: format!("{}@{}", event_number, stream).into_bytes(),
        metadata: vec![],
    }
}

/// Transaction log held in memory.
///
/// Serves forward reads over the whole log and accepts appends, so it can
/// stand in for both the log read service and the catalog write service.
#[derive(Default)]
pub struct InMemoryTransactionLog {
    state: RwLock<LogState>,
}

impl InMemoryTransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Physical end of the log.
    pub async fn tail_position(&self) -> i64 {
        self.state.read().await.next_offset
    }

    /// Number of events in the log.
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Last event number of `stream`, if it exists.
    pub async fn last_event_number(&self, stream: &str) -> Option<i64> {
        self.state.read().await.last_event_numbers.get(stream).copied()
    }

    /// Append `events` to `stream` as a single transaction.
    pub async fn append_events(
        &self,
        stream: &str,
        expected_version: ExpectedVersion,
        events: Vec<EventData>,
        correlation_id: Uuid,
    ) -> WriteCompleted {
        let mut state = self.state.write().await;
        let current = state.last_event_numbers.get(stream).copied();

        let version_ok = match expected_version {
            ExpectedVersion::Any => true,
            ExpectedVersion::NoStream => current.is_none(),
            ExpectedVersion::Exact(version) => current.unwrap_or(-1) == version,
        };
        if !version_ok {
            return WriteCompleted::failed(
                correlation_id,
                OperationResult::WrongExpectedVersion,
                format!(
                    "Stream '{}' is at {:?}, expected {:?}",
                    stream, current, expected_version
                ),
            );
        }

        let first_event_number = current.unwrap_or(-1) + 1;
        if events.is_empty() {
            return WriteCompleted::success(correlation_id, first_event_number);
        }

        let count = events.len();
        let timestamp = Utc::now();
        let mut prepared = Vec::with_capacity(count);
        for (i, event) in events.into_iter().enumerate() {
            let mut flags = PrepareFlags::DATA | PrepareFlags::IS_COMMITTED;
            if event.is_json {
                flags = flags | PrepareFlags::IS_JSON;
            }
            if i == 0 {
                flags = flags | PrepareFlags::TRANSACTION_BEGIN;
            }
            if i + 1 == count {
                flags = flags | PrepareFlags::TRANSACTION_END;
            }

            let log_position = state.next_offset;
            state.next_offset +=
                PREPARE_HEADER_BYTES + event.data.len() as i64 + event.metadata.len() as i64;
            prepared.push(EventRecord {
                event_number: first_event_number + i as i64,
                log_position,
                event_id: event.event_id,
                event_stream_id: stream.to_string(),
                event_type: event.event_type,
                flags,
                data: event.data,
                metadata: event.metadata,
                timestamp,
            });
        }

        let commit_position = state.next_offset;
        state.next_offset += COMMIT_RECORD_BYTES;

        for record in prepared {
            let index = state.records.len();
            state
                .by_stream
                .insert((stream.to_string(), record.event_number), index);
            state.records.push(StoredRecord {
                record,
                commit_position,
            });
        }
        state
            .last_event_numbers
            .insert(stream.to_string(), first_event_number + count as i64 - 1);

        debug!(
            stream = %stream,
            count,
            commit_position,
            "Appended events"
        );
        WriteCompleted::success(correlation_id, first_event_number)
    }
}

#[async_trait]
impl LogReader for InMemoryTransactionLog {
    async fn read_all_forward(&self, request: ReadAllForward) -> Result<ReadAllResult> {
        let from = Position::new(request.commit_position, request.prepare_position);
        if from.commit < 0 || from.prepare < 0 {
            return Err(LogReadError::InvalidPosition(from));
        }

        let state = self.state.read().await;
        let start = state.records.partition_point(|r| r.position() < from);
        let end = start.saturating_add(request.max_count).min(state.records.len());

        let records: Vec<_> = state.records[start..end]
            .iter()
            .map(|stored| state.resolve(stored, request.resolve_links))
            .collect();

        let next_position = match state.records.get(end) {
            Some(next) => next.position(),
            None if records.is_empty() => from,
            None => Position::new(state.next_offset, state.next_offset),
        };

        Ok(ReadAllResult {
            correlation_id: request.correlation_id,
            records,
            next_position,
            tail_position: state.next_offset,
        })
    }
}

#[async_trait]
impl CatalogWriter for InMemoryTransactionLog {
    async fn append(&self, write: AppendWrite) -> WriteCompleted {
        self.append_events(
            &write.event_stream_id,
            write.expected_version,
            write.events,
            write.correlation_id,
        )
        .await
    }
}
