//! In-memory channel-based publisher.
//!
//! Uses an unbounded tokio mpsc channel so the distributor never blocks on a
//! slow consumer and no message is dropped or reordered.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::distribution::DistributionMessage;
use crate::interfaces::DistributionPublisher;

/// Publisher backed by a tokio mpsc channel.
#[derive(Clone)]
pub struct ChannelPublisher {
    sender: mpsc::UnboundedSender<DistributionMessage>,
}

impl ChannelPublisher {
    /// Create a publisher and the receiver its consumer reads from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DistributionMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Whether the consuming side has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl DistributionPublisher for ChannelPublisher {
    fn publish(&self, message: DistributionMessage) {
        let position = message.position();
        match self.sender.send(message) {
            Ok(()) => debug!(position = %position, "Published via channel"),
            Err(_) => warn!(position = %position, "Channel consumer gone, message dropped"),
        }
    }
}
