//! Log and catalog service implementations.
//!
//! - `InMemoryTransactionLog`: serves forward reads and accepts appends
//! - `mock`: scripted doubles for failure-path testing

pub mod memory;
pub mod mock;

pub use memory::{link_to, InMemoryTransactionLog, LINK_EVENT_TYPE};
pub use mock::{MockCatalogWriter, MockLogReader};
