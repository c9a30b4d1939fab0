//! Registration integration tests.
//!
//! Registers projections in the in-memory log and reads the catalog stream
//! back through a distribution point.

use std::sync::Arc;

use logfeed::bus::ChannelPublisher;
use logfeed::distribution::{DistributionConfig, DistributionMessage, DistributionPoint};
use logfeed::position::Position;
use logfeed::registration::{
    ProjectionMode, ProjectionRegistration, Registrar, RegistrationConfig, PROJECTION_CREATED,
};
use logfeed::storage::InMemoryTransactionLog;

#[tokio::test(start_paused = true)]
async fn test_registration_is_distributed_from_catalog_stream() {
    let log = Arc::new(InMemoryTransactionLog::new());
    let registrar = Registrar::new(log.clone(), RegistrationConfig::default());
    let registration = ProjectionRegistration::continuous("orders-by-customer", "js", "fromAll()");

    let outcome = registrar.register(&registration).await.unwrap();
    assert!(outcome.is_registered());

    let (publisher, mut messages) = ChannelPublisher::new();
    let point = DistributionPoint::transaction_log(
        Position::START,
        DistributionConfig::default(),
        log.clone(),
        Arc::new(publisher),
    );
    point.resume().await.unwrap();

    let Some(DistributionMessage::Committed(created)) = messages.recv().await else {
        panic!("expected the catalog event");
    };
    assert_eq!(created.event_stream_id, "$projections-$all");
    assert_eq!(created.event.event_type, PROJECTION_CREATED);
    assert!(created.event.is_json);

    let decoded: ProjectionRegistration = serde_json::from_slice(&created.event.data).unwrap();
    assert_eq!(decoded.name, "orders-by-customer");
    assert_eq!(decoded.mode, ProjectionMode::Continuous);

    point.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_custom_catalog_stream() {
    let log = Arc::new(InMemoryTransactionLog::new());
    let config = RegistrationConfig::default().with_catalog_stream("$projections-tenant-a");
    let registrar = Registrar::new(log.clone(), config);

    registrar
        .register(&ProjectionRegistration::continuous("p", "js", ""))
        .await
        .unwrap();

    assert_eq!(log.last_event_number("$projections-tenant-a").await, Some(0));
    assert_eq!(log.last_event_number("$projections-$all").await, None);
}
