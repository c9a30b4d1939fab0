//! Notifications emitted by a distributor.

use uuid::Uuid;

use crate::position::Position;

/// Event payload as seen by a consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_id: Uuid,
    pub event_type: String,
    pub is_json: bool,
    pub data: Vec<u8>,
    pub metadata: Vec<u8>,
}

/// A committed record delivered to consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedEventDistributed {
    /// Identifies the distributor that produced this message.
    pub correlation_id: Uuid,
    pub position: Position,
    /// Stream and number of the record stored in the log (the link, for links).
    pub event_stream_id: String,
    pub event_number: i64,
    /// Stream and number of the resolved event.
    pub origin_stream_id: String,
    pub origin_event_number: i64,
    pub is_link: bool,
    pub event: Event,
    /// Prepare offset a live reader must have passed before this reader may join it.
    pub safe_join_position: i64,
    /// Advisory completion estimate relative to the log tail at read time.
    pub progress: f32,
}

/// Sentinel emitted when the distributor has caught up with the log tail.
#[derive(Debug, Clone, PartialEq)]
pub struct EndOfLogMarker {
    pub correlation_id: Uuid,
    /// Last requested position.
    pub position: Position,
    pub safe_join_position: i64,
    pub progress: f32,
}

/// Everything a distributor hands to its publisher.
#[derive(Debug, Clone, PartialEq)]
pub enum DistributionMessage {
    Committed(CommittedEventDistributed),
    EndOfLog(EndOfLogMarker),
}

impl DistributionMessage {
    pub fn correlation_id(&self) -> Uuid {
        match self {
            DistributionMessage::Committed(e) => e.correlation_id,
            DistributionMessage::EndOfLog(m) => m.correlation_id,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            DistributionMessage::Committed(e) => e.position,
            DistributionMessage::EndOfLog(m) => m.position,
        }
    }

    pub fn as_committed(&self) -> Option<&CommittedEventDistributed> {
        match self {
            DistributionMessage::Committed(e) => Some(e),
            DistributionMessage::EndOfLog(_) => None,
        }
    }

    pub fn is_end_of_log(&self) -> bool {
        matches!(self, DistributionMessage::EndOfLog(_))
    }
}
