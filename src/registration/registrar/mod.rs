//! Async registration driver.

use std::sync::Arc;
use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use futures::future::join_all;
use tracing::{info, warn};

use super::config::RegistrationConfig;
use super::coordinator::{RegistrationCoordinator, RegistrationStep};
use super::types::{ProjectionRegistration, RegistrationError, RegistrationOutcome, Result};
use crate::interfaces::CatalogWriter;
use crate::utils::retry::registration_backoff;

/// Registers projections in the catalog stream with bounded retries.
pub struct Registrar {
    writer: Arc<dyn CatalogWriter>,
    config: RegistrationConfig,
    backoff: ExponentialBuilder,
}

impl Registrar {
    pub fn new(writer: Arc<dyn CatalogWriter>, config: RegistrationConfig) -> Self {
        let backoff = registration_backoff(&config);
        Self {
            writer,
            config,
            backoff,
        }
    }

    /// Replace the delay schedule between reissued writes.
    pub fn with_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// Register `registration`, returning its terminal outcome.
    ///
    /// Write failures end in [`RegistrationOutcome::RegistrationFailed`];
    /// `Err` is reserved for setup problems.
    pub async fn register(
        &self,
        registration: &ProjectionRegistration,
    ) -> Result<RegistrationOutcome> {
        let mut coordinator = RegistrationCoordinator::new(registration, &self.config)?;
        let mut delays = self.backoff.build();
        let mut write = coordinator.start()?;

        loop {
            let completed = self.writer.append(write.clone()).await;
            match coordinator.handle(completed)? {
                RegistrationStep::Resolved(outcome) => {
                    match &outcome {
                        RegistrationOutcome::Registered { attempts, .. } => info!(
                            projection = %registration.name,
                            attempts,
                            "Projection registered"
                        ),
                        RegistrationOutcome::RegistrationFailed {
                            reason, attempts, ..
                        } => warn!(
                            projection = %registration.name,
                            attempts,
                            reason = %reason,
                            "Projection registration failed"
                        ),
                    }
                    return Ok(outcome);
                }
                RegistrationStep::Retry(next) => {
                    let delay = delays.next().unwrap_or(Duration::ZERO);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    write = next;
                }
                RegistrationStep::Stale => {
                    return Err(RegistrationError::UnmatchedCompletion(write.correlation_id));
                }
            }
        }
    }

    /// Register every entry concurrently. Outcomes are returned in input order.
    pub async fn register_all(
        &self,
        registrations: &[ProjectionRegistration],
    ) -> Vec<Result<RegistrationOutcome>> {
        join_all(registrations.iter().map(|r| self.register(r))).await
    }
}
