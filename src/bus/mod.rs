//! Publishers for distribution notifications.
//!
//! This module contains:
//! - `ChannelPublisher`: hands messages to an in-process consumer over a tokio channel
//! - `MockPublisher`: records messages for tests

pub mod channel;
pub mod mock;

pub use channel::ChannelPublisher;
pub use mock::MockPublisher;

pub use crate::interfaces::DistributionPublisher;
