//! Delivery channel for distribution notifications.

use crate::distribution::DistributionMessage;

/// Fire-and-forget sink for messages emitted by a distributor.
///
/// No delivery confirmation flows back to the emitter. Implementations must
/// not block: the distributor calls `publish` from its own task.
///
/// # Implementations
///
/// - `ChannelPublisher`: tokio mpsc channel
/// - `MockPublisher`: records messages for tests
pub trait DistributionPublisher: Send + Sync {
    /// Hand over a message. Ownership moves to the publisher.
    fn publish(&self, message: DistributionMessage);
}
