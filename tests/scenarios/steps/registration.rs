//! Projection registration step definitions.

use std::sync::Arc;

use cucumber::{given, then, when, World};

use logfeed::interfaces::OperationResult;
use logfeed::registration::{
    ProjectionRegistration, Registrar, RegistrationConfig, RegistrationOutcome,
};
use logfeed::storage::{InMemoryTransactionLog, MockCatalogWriter};

/// Test context for registration scenarios.
#[derive(Debug, Default, World)]
pub struct RegistrationWorld {
    config: RegistrationConfig,
    scripted: Vec<OperationResult>,
    fail_always: Option<OperationResult>,
    outcome: Option<RegistrationOutcome>,
    write_count: usize,
    catalog_last_event: Option<i64>,
}

fn parse_result(name: &str) -> OperationResult {
    match name.trim() {
        "Success" => OperationResult::Success,
        "PrepareTimeout" => OperationResult::PrepareTimeout,
        "CommitTimeout" => OperationResult::CommitTimeout,
        "ForwardTimeout" => OperationResult::ForwardTimeout,
        "WrongExpectedVersion" => OperationResult::WrongExpectedVersion,
        "StreamDeleted" => OperationResult::StreamDeleted,
        "InvalidTransaction" => OperationResult::InvalidTransaction,
        "AccessDenied" => OperationResult::AccessDenied,
        other => panic!("Unknown operation result: {}", other),
    }
}

fn registration(name: &str) -> ProjectionRegistration {
    ProjectionRegistration::continuous(name, "js", "fromCategory('orders')")
}

// --- Given steps ---

#[given(expr = "a registrar allowing {int} attempts")]
async fn given_registrar_attempts(world: &mut RegistrationWorld, attempts: u32) {
    world.config = RegistrationConfig::default().with_max_attempts(attempts);
}

#[given("a registrar with the default configuration")]
async fn given_default_registrar(world: &mut RegistrationWorld) {
    world.config = RegistrationConfig::default();
}

#[given(expr = "the catalog answers {string}")]
async fn given_catalog_answers(world: &mut RegistrationWorld, results: String) {
    world.scripted = results.split(',').map(parse_result).collect();
}

#[given(expr = "the catalog always answers {string}")]
async fn given_catalog_always(world: &mut RegistrationWorld, result: String) {
    world.fail_always = Some(parse_result(&result));
}

// --- When steps ---

#[when(expr = "projection {string} is registered")]
async fn when_registered(world: &mut RegistrationWorld, name: String) {
    let writer = Arc::new(MockCatalogWriter::new());
    for result in &world.scripted {
        writer.push_result(*result);
    }
    if let Some(result) = world.fail_always {
        writer.set_fail_always(result);
    }

    let registrar = Registrar::new(writer.clone(), world.config.clone());
    let outcome = registrar
        .register(&registration(&name))
        .await
        .expect("Registration setup failed");

    world.outcome = Some(outcome);
    world.write_count = writer.write_count();
}

#[when(expr = "projection {string} is registered against the in-memory log")]
async fn when_registered_in_memory(world: &mut RegistrationWorld, name: String) {
    let log = Arc::new(InMemoryTransactionLog::new());
    let registrar = Registrar::new(log.clone(), world.config.clone());
    let outcome = registrar
        .register(&registration(&name))
        .await
        .expect("Registration setup failed");

    world.outcome = Some(outcome);
    world.catalog_last_event = log.last_event_number(&world.config.catalog_stream).await;
}

// --- Then steps ---

#[then("the projection is registered")]
async fn then_registered(world: &mut RegistrationWorld) {
    let outcome = world.outcome.as_ref().expect("No outcome recorded");
    assert!(outcome.is_registered(), "Expected success, got {:?}", outcome);
}

#[then(expr = "the registration fails with {string}")]
async fn then_fails_with(world: &mut RegistrationWorld, result: String) {
    let expected = parse_result(&result);
    match world.outcome.as_ref().expect("No outcome recorded") {
        RegistrationOutcome::RegistrationFailed { reason, .. } => assert_eq!(*reason, expected),
        other => panic!("Expected failure, got {:?}", other),
    }
}

#[then(expr = "exactly {int} writes were issued")]
async fn then_write_count(world: &mut RegistrationWorld, count: usize) {
    assert_eq!(world.write_count, count);
    let outcome = world.outcome.as_ref().expect("No outcome recorded");
    assert_eq!(outcome.attempts() as usize, count);
}

#[then(expr = "the catalog stream {string} holds {int} registration")]
async fn then_catalog_holds(world: &mut RegistrationWorld, stream: String, count: i64) {
    assert_eq!(stream, world.config.catalog_stream);
    assert_eq!(world.catalog_last_event, Some(count - 1));
}
