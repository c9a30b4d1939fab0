//! Projection registration in the catalog stream.
//!
//! - `RegistrationCoordinator`: bounded-retry state machine (no I/O)
//! - `Registrar`: drives a coordinator against a `CatalogWriter`

pub mod config;
pub mod coordinator;
pub mod registrar;
pub mod types;

pub use config::RegistrationConfig;
pub use coordinator::{RegistrationCoordinator, RegistrationStep};
pub use registrar::Registrar;
pub use types::{
    ProjectionMode, ProjectionRegistration, RegistrationError, RegistrationOutcome, Result, RunAs,
    PROJECTION_CREATED,
};
