//! logfeed-demo: end-to-end walk through the distribution core
//!
//! Registers a projection in the catalog stream, appends a few events to an
//! in-memory transaction log, then streams the whole log through a
//! distribution point until the end-of-log marker arrives.
//!
//! ## Configuration
//! - LOGFEED_CONFIG: Path to a YAML config file (optional)
//! - LOGFEED__*: Per-setting overrides, e.g. LOGFEED__DISTRIBUTION__MAX_READ_COUNT
//! - LOGFEED_LOG: Log filter (default: info)

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use logfeed::bus::ChannelPublisher;
use logfeed::config::Config;
use logfeed::distribution::{DistributionMessage, DistributionPoint};
use logfeed::interfaces::{EventData, ExpectedVersion};
use logfeed::position::Position;
use logfeed::registration::{ProjectionRegistration, Registrar};
use logfeed::storage::{link_to, InMemoryTransactionLog};
use logfeed::utils::bootstrap::init_tracing;

fn order_event(event_type: &str, order: u32) -> EventData {
    EventData {
        event_id: Uuid::new_v4(),
        event_type: event_type.to_string(),
        is_json: true,
        data: format!(r#"{{"order":{}}}"#, order).into_bytes(),
        metadata: vec![],
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref())?;

    let log = Arc::new(InMemoryTransactionLog::new());

    let registrar = Registrar::new(log.clone(), config.registration.clone());
    let registration =
        ProjectionRegistration::continuous("orders-by-customer", "js", "fromCategory('orders')");
    let outcome = registrar.register(&registration).await?;
    info!(?outcome, "Registration finished");

    for order in 1..=3 {
        let stream = format!("orders-{}", order);
        log.append_events(
            &stream,
            ExpectedVersion::NoStream,
            vec![order_event("OrderPlaced", order)],
            Uuid::new_v4(),
        )
        .await;
        log.append_events(
            "$ce-orders",
            ExpectedVersion::Any,
            vec![link_to(&stream, 0)],
            Uuid::new_v4(),
        )
        .await;
    }

    let (publisher, mut messages) = ChannelPublisher::new();
    let point = DistributionPoint::transaction_log(
        Position::START,
        config.distribution.clone(),
        log.clone(),
        Arc::new(publisher),
    );
    point.resume().await?;

    while let Some(message) = messages.recv().await {
        match message {
            DistributionMessage::Committed(event) => info!(
                position = %event.position,
                stream = %event.event_stream_id,
                number = event.event_number,
                origin = %event.origin_stream_id,
                event_type = %event.event.event_type,
                progress = event.progress,
                "Distributed"
            ),
            DistributionMessage::EndOfLog(marker) => {
                info!(position = %marker.position, "Reached end of log");
                break;
            }
        }
    }

    let position = point.shutdown().await?;
    info!(%position, "logfeed-demo finished");
    Ok(())
}
