//! Async driver for log cursors.
//!
//! A [`DistributionPoint`] owns one cursor inside a dedicated tokio task and
//! is the only place its actions turn into I/O. Resume/pause calls from any
//! thread are posted to the task's mailbox, so the cursor itself never needs
//! synchronization.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::config::DistributionConfig;
use super::cursor::{CursorAction, CursorEvent, LogCursor};
use super::error::{DistributionError, Result};
use super::transaction_log::TransactionLogDistributor;
use crate::interfaces::{
    DistributionPublisher, LogReadError, LogReader, ReadAllForward, ReadAllResult,
};
use crate::position::Position;

enum Control {
    Resume(oneshot::Sender<Result<()>>),
    Pause(oneshot::Sender<Result<()>>),
    Dispose,
}

enum Internal {
    ReadCompleted(std::result::Result<ReadAllResult, LogReadError>),
    Tick,
}

/// Cloneable control handle for a running distribution point.
#[derive(Clone)]
pub struct DistributionHandle {
    correlation_id: Uuid,
    control: mpsc::UnboundedSender<Control>,
}

impl DistributionHandle {
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Resume distribution. Fails if the cursor is not paused.
    pub async fn resume(&self) -> Result<()> {
        let (reply, outcome) = oneshot::channel();
        self.control
            .send(Control::Resume(reply))
            .map_err(|_| DistributionError::Stopped)?;
        outcome.await.map_err(|_| DistributionError::Stopped)?
    }

    /// Request a pause. Takes effect once any outstanding read completes.
    pub async fn pause(&self) -> Result<()> {
        let (reply, outcome) = oneshot::channel();
        self.control
            .send(Control::Pause(reply))
            .map_err(|_| DistributionError::Stopped)?;
        outcome.await.map_err(|_| DistributionError::Stopped)?
    }

    /// Dispose the cursor and stop the task. Idempotent.
    pub fn dispose(&self) {
        let _ = self.control.send(Control::Dispose);
    }
}

/// A cursor running on its own task.
pub struct DistributionPoint {
    handle: DistributionHandle,
    task: JoinHandle<Result<Position>>,
}

impl DistributionPoint {
    /// Start a transaction-log distributor, paused at `from`.
    pub fn transaction_log(
        from: Position,
        config: DistributionConfig,
        reader: Arc<dyn LogReader>,
        publisher: Arc<dyn DistributionPublisher>,
    ) -> Self {
        let cursor = TransactionLogDistributor::new(Uuid::new_v4(), from, config);
        Self::spawn(cursor, reader, publisher)
    }

    /// Run `cursor` on a new task. Must be called within a tokio runtime.
    pub fn spawn<C>(
        cursor: C,
        reader: Arc<dyn LogReader>,
        publisher: Arc<dyn DistributionPublisher>,
    ) -> Self
    where
        C: LogCursor + 'static,
    {
        let correlation_id = cursor.correlation_id();
        let (control, control_rx) = mpsc::unbounded_channel();
        let (internal, internal_rx) = mpsc::unbounded_channel();

        let runner = Runner {
            cursor,
            reader,
            publisher,
            internal,
        };
        let task = tokio::spawn(runner.run(control_rx, internal_rx));

        info!(distributor = %correlation_id, "Distribution point started");

        Self {
            handle: DistributionHandle {
                correlation_id,
                control,
            },
            task,
        }
    }

    pub fn handle(&self) -> DistributionHandle {
        self.handle.clone()
    }

    pub fn correlation_id(&self) -> Uuid {
        self.handle.correlation_id
    }

    pub async fn resume(&self) -> Result<()> {
        self.handle.resume().await
    }

    pub async fn pause(&self) -> Result<()> {
        self.handle.pause().await
    }

    pub fn dispose(&self) {
        self.handle.dispose()
    }

    /// Wait for the task to end, by disposal or by a fatal error.
    ///
    /// Returns the cursor's position at the time it stopped.
    pub async fn join(self) -> Result<Position> {
        let DistributionPoint { handle, task } = self;
        let outcome = task.await;
        drop(handle);
        match outcome {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Distribution task aborted");
                Err(DistributionError::Stopped)
            }
        }
    }

    /// Dispose, then wait for the task to end.
    pub async fn shutdown(self) -> Result<Position> {
        self.dispose();
        self.join().await
    }
}

struct Runner<C> {
    cursor: C,
    reader: Arc<dyn LogReader>,
    publisher: Arc<dyn DistributionPublisher>,
    internal: mpsc::UnboundedSender<Internal>,
}

impl<C: LogCursor> Runner<C> {
    async fn run(
        mut self,
        mut control: mpsc::UnboundedReceiver<Control>,
        mut internal: mpsc::UnboundedReceiver<Internal>,
    ) -> Result<Position> {
        let correlation_id = self.cursor.correlation_id();
        loop {
            tokio::select! {
                biased;
                command = control.recv() => match command {
                    Some(Control::Resume(reply)) => {
                        self.reply(reply, CursorEvent::Resume)?;
                    }
                    Some(Control::Pause(reply)) => {
                        self.reply(reply, CursorEvent::Pause)?;
                    }
                    Some(Control::Dispose) | None => {
                        self.cursor.dispose();
                        info!(
                            distributor = %correlation_id,
                            position = %self.cursor.position(),
                            "Distribution point disposed"
                        );
                        return Ok(self.cursor.position());
                    }
                },
                Some(message) = internal.recv() => match message {
                    Internal::ReadCompleted(Ok(result)) => {
                        self.apply(CursorEvent::ReadCompleted(result))
                            .inspect_err(|e| self.halt(e))?;
                    }
                    Internal::ReadCompleted(Err(e)) => {
                        let e = DistributionError::from(e);
                        self.halt(&e);
                        return Err(e);
                    }
                    Internal::Tick => {
                        self.apply(CursorEvent::Tick).inspect_err(|e| self.halt(e))?;
                    }
                },
            }
        }
    }

    /// Apply a caller's control event and send the verdict back.
    ///
    /// Misuse is the caller's problem and only rejects the call; a fatal
    /// error also stops the task.
    fn reply(&mut self, reply: oneshot::Sender<Result<()>>, event: CursorEvent) -> Result<()> {
        let outcome = self.apply(event);
        let fatal = match &outcome {
            Err(e) if e.is_fatal() => Some(e.clone()),
            _ => None,
        };
        let _ = reply.send(outcome);
        match fatal {
            Some(e) => {
                self.halt(&e);
                Err(e)
            }
            None => Ok(()),
        }
    }

    fn halt(&mut self, e: &DistributionError) {
        error!(
            distributor = %self.cursor.correlation_id(),
            position = %self.cursor.position(),
            error = %e,
            "Distribution point halted"
        );
        self.cursor.dispose();
    }

    fn apply(&mut self, event: CursorEvent) -> Result<()> {
        for action in self.cursor.handle(event)? {
            self.execute(action);
        }
        Ok(())
    }

    fn execute(&self, action: CursorAction) {
        match action {
            CursorAction::Emit(message) => self.publisher.publish(message),
            CursorAction::Read(request) => self.spawn_read(request, None),
            CursorAction::ScheduleRead { delay, request } => {
                self.spawn_read(request, Some(delay))
            }
            CursorAction::ScheduleTick => {
                let _ = self.internal.send(Internal::Tick);
            }
        }
    }

    fn spawn_read(&self, request: ReadAllForward, delay: Option<std::time::Duration>) {
        let reader = self.reader.clone();
        let completions = self.internal.clone();
        debug!(
            distributor = %request.correlation_id,
            commit = request.commit_position,
            prepare = request.prepare_position,
            max_count = request.max_count,
            delay = ?delay,
            "Requesting events"
        );
        tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let result = reader.read_all_forward(request).await;
            // The runner may already be gone after a dispose.
            let _ = completions.send(Internal::ReadCompleted(result));
        });
    }
}
