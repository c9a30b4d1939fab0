//! Transaction log distribution step definitions.
//!
//! Drives a `TransactionLogDistributor` by hand, answering its reads from a
//! scripted log so every transition can be observed.

use std::time::Duration;

use chrono::Utc;
use cucumber::{given, then, when, World};
use uuid::Uuid;

use logfeed::distribution::{
    CursorAction, CursorEvent, CursorState, DistributionConfig, DistributionError,
    DistributionMessage, InvalidState, LogCursor, TransactionLogDistributor,
};
use logfeed::interfaces::{
    EventRecord, PrepareFlags, ReadAllForward, ReadAllResult, ResolvedEventRecord,
};
use logfeed::position::Position;

/// Test context for distribution scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct DistributionWorld {
    distributor: Option<TransactionLogDistributor>,
    records: Vec<Position>,
    next_position: Position,
    reverse: bool,
    outstanding: Option<ReadAllForward>,
    last_actions: Vec<CursorAction>,
    emitted: Vec<DistributionMessage>,
    error: Option<DistributionError>,
}

impl DistributionWorld {
    fn new() -> Self {
        Self {
            distributor: None,
            records: Vec::new(),
            next_position: Position::START,
            reverse: false,
            outstanding: None,
            last_actions: Vec::new(),
            emitted: Vec::new(),
            error: None,
        }
    }

    fn distributor(&mut self) -> &mut TransactionLogDistributor {
        self.distributor
            .as_mut()
            .expect("Distributor not initialized")
    }

    fn apply(&mut self, event: CursorEvent) {
        match self.distributor().handle(event) {
            Ok(actions) => self.absorb(actions),
            Err(e) => {
                self.last_actions.clear();
                self.error = Some(e);
            }
        }
    }

    fn absorb(&mut self, actions: Vec<CursorAction>) {
        for action in &actions {
            match action {
                CursorAction::Emit(message) => self.emitted.push(message.clone()),
                CursorAction::Read(request) | CursorAction::ScheduleRead { request, .. } => {
                    self.outstanding = Some(request.clone())
                }
                CursorAction::ScheduleTick => {}
            }
        }
        self.last_actions = actions;
    }

    /// Answer `request` from the scripted log.
    fn answer(&self, request: &ReadAllForward) -> ReadAllResult {
        let from = Position::new(request.commit_position, request.prepare_position);
        let mut available: Vec<Position> = self
            .records
            .iter()
            .copied()
            .filter(|p| *p >= from)
            .collect();
        available.sort();

        let taken: Vec<Position> = available.iter().copied().take(request.max_count).collect();
        let next_position = match available.get(taken.len()) {
            Some(next) => *next,
            None if taken.is_empty() => from,
            None => self.next_position,
        };

        let mut records: Vec<ResolvedEventRecord> = taken
            .iter()
            .enumerate()
            .map(|(i, position)| make_resolved(i as i64, *position))
            .collect();
        if self.reverse {
            records.reverse();
        }

        ReadAllResult {
            correlation_id: request.correlation_id,
            records,
            next_position,
            tail_position: self.next_position.commit,
        }
    }

    fn committed_positions(&self) -> Vec<Position> {
        self.emitted
            .iter()
            .filter_map(|m| m.as_committed())
            .map(|e| e.position)
            .collect()
    }
}

fn make_resolved(number: i64, position: Position) -> ResolvedEventRecord {
    ResolvedEventRecord {
        event: EventRecord {
            event_number: number,
            log_position: position.prepare,
            event_id: Uuid::new_v4(),
            event_stream_id: "orders-1".to_string(),
            event_type: "OrderPlaced".to_string(),
            flags: PrepareFlags::DATA | PrepareFlags::IS_JSON,
            data: br#"{"order":1}"#.to_vec(),
            metadata: vec![],
            timestamp: Utc::now(),
        },
        link: None,
        commit_position: position.commit,
    }
}

fn parse_positions(list: &str) -> Vec<Position> {
    list.split(',')
        .map(|entry| {
            let (commit, prepare) = entry
                .trim()
                .split_once(':')
                .expect("Position must be commit:prepare");
            Position::new(
                commit.parse().expect("Invalid commit position"),
                prepare.parse().expect("Invalid prepare position"),
            )
        })
        .collect()
}

// --- Given steps ---

#[given(expr = "a distributor starting at commit {int} prepare {int} with a window of {int}")]
async fn given_distributor(world: &mut DistributionWorld, commit: i64, prepare: i64, window: usize) {
    let config = DistributionConfig::default().with_max_read_count(window);
    world.distributor = Some(TransactionLogDistributor::new(
        Uuid::new_v4(),
        Position::new(commit, prepare),
        config,
    ));
}

#[given(expr = "the log holds records at positions {string}")]
async fn given_log_records(world: &mut DistributionWorld, positions: String) {
    world.records = parse_positions(&positions);
}

#[given(expr = "the log reports next position commit {int} prepare {int}")]
async fn given_next_position(world: &mut DistributionWorld, commit: i64, prepare: i64) {
    world.next_position = Position::new(commit, prepare);
}

#[given("the log returns its records in reverse")]
async fn given_reverse(world: &mut DistributionWorld) {
    world.reverse = true;
}

// --- When steps ---

#[when("the distributor is resumed")]
async fn when_resumed(world: &mut DistributionWorld) {
    world.apply(CursorEvent::Resume);
}

#[when("the distributor is paused")]
async fn when_paused(world: &mut DistributionWorld) {
    world.apply(CursorEvent::Pause);
}

#[when("the distributor is disposed")]
async fn when_disposed(world: &mut DistributionWorld) {
    world.distributor().dispose();
}

#[when("the outstanding read completes")]
async fn when_read_completes(world: &mut DistributionWorld) {
    let request = world.outstanding.take().expect("No read outstanding");
    let result = world.answer(&request);
    world.apply(CursorEvent::ReadCompleted(result));
}

#[when("the scheduled tick fires")]
async fn when_tick_fires(world: &mut DistributionWorld) {
    assert!(
        world.last_actions.contains(&CursorAction::ScheduleTick),
        "No tick scheduled: {:?}",
        world.last_actions
    );
    world.apply(CursorEvent::Tick);
}

// --- Then steps ---

#[then(expr = "a read is issued from commit {int} prepare {int}")]
async fn then_read_issued(world: &mut DistributionWorld, commit: i64, prepare: i64) {
    let issued = world.last_actions.iter().any(|a| {
        matches!(a, CursorAction::Read(r)
            if r.commit_position == commit && r.prepare_position == prepare)
    });
    assert!(issued, "Expected read from {}:{}, got {:?}", commit, prepare, world.last_actions);
}

#[then(expr = "{int} committed events have been emitted in position order")]
async fn then_committed_emitted(world: &mut DistributionWorld, count: usize) {
    let positions = world.committed_positions();
    assert_eq!(positions.len(), count);
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[then("an end-of-log marker has been emitted")]
async fn then_end_of_log(world: &mut DistributionWorld) {
    assert!(world.emitted.iter().any(|m| m.is_end_of_log()));
}

#[then(expr = "the distributor position is commit {int} prepare {int}")]
async fn then_position(world: &mut DistributionWorld, commit: i64, prepare: i64) {
    assert_eq!(world.distributor().position(), Position::new(commit, prepare));
}

#[then("the next read is scheduled without delay")]
async fn then_tick_scheduled(world: &mut DistributionWorld) {
    assert!(world.last_actions.contains(&CursorAction::ScheduleTick));
}

#[then(expr = "the next read is delayed by {int} ms")]
async fn then_read_delayed(world: &mut DistributionWorld, millis: u64) {
    let delayed = world.last_actions.iter().any(|a| {
        matches!(a, CursorAction::ScheduleRead { delay, .. }
            if *delay == Duration::from_millis(millis))
    });
    assert!(delayed, "Expected delayed read, got {:?}", world.last_actions);
}

#[then("the distributor is waiting for its read to complete before pausing")]
async fn then_pause_requested(world: &mut DistributionWorld) {
    assert_eq!(world.distributor().state(), CursorState::PauseRequested);
}

#[then("the distributor has paused")]
async fn then_paused(world: &mut DistributionWorld) {
    assert_eq!(world.distributor().state(), CursorState::Paused);
}

#[then("no further read is requested")]
async fn then_no_read(world: &mut DistributionWorld) {
    assert!(!world.distributor().read_in_flight());
    assert!(world
        .last_actions
        .iter()
        .all(|a| matches!(a, CursorAction::Emit(_))));
}

#[then("the distributor halts with an ordering violation")]
async fn then_ordering_violation(world: &mut DistributionWorld) {
    assert!(matches!(
        world.error,
        Some(DistributionError::OutOfOrder { .. })
    ));
    assert!(world.distributor().is_faulted());
}

#[then("resuming the distributor is rejected")]
async fn then_resume_rejected(world: &mut DistributionWorld) {
    let err = world.distributor().resume().unwrap_err();
    assert!(matches!(
        err,
        DistributionError::InvalidState(InvalidState::Disposed)
    ));
}
