//! Mock publisher implementation for testing.

use std::sync::Mutex;

use crate::distribution::{CommittedEventDistributed, DistributionMessage};
use crate::interfaces::DistributionPublisher;

/// Mock publisher that records every message.
#[derive(Default)]
pub struct MockPublisher {
    published: Mutex<Vec<DistributionMessage>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_published<T>(&self, f: impl FnOnce(&mut Vec<DistributionMessage>) -> T) -> T {
        let mut published = self
            .published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut published)
    }

    pub fn published(&self) -> Vec<DistributionMessage> {
        self.with_published(|p| p.clone())
    }

    pub fn published_count(&self) -> usize {
        self.with_published(|p| p.len())
    }

    pub fn take_published(&self) -> Vec<DistributionMessage> {
        self.with_published(std::mem::take)
    }

    /// Committed events only, in publish order.
    pub fn committed(&self) -> Vec<CommittedEventDistributed> {
        self.with_published(|p| p.iter().filter_map(|m| m.as_committed().cloned()).collect())
    }

    pub fn end_of_log_count(&self) -> usize {
        self.with_published(|p| p.iter().filter(|m| m.is_end_of_log()).count())
    }
}

impl DistributionPublisher for MockPublisher {
    fn publish(&self, message: DistributionMessage) {
        self.with_published(|p| p.push(message));
    }
}
