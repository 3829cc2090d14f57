//! Multi-producer, single-consumer event loop

use placement_core::{ArEngine, ArEvent, Notification, PlacementController};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

/// Notification backlog kept for slow subscribers
const NOTIFICATION_CAPACITY: usize = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Event dispatcher has shut down")]
    Closed,
    #[error("Event queue is full")]
    Full,
}

enum Command {
    Event(ArEvent),
    Barrier(oneshot::Sender<()>),
}

/// Producer side of the event queue; cheap to clone, one per producer
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<Command>,
    notifications: broadcast::Sender<Notification>,
}

impl DispatcherHandle {
    /// Enqueue an event, waiting for room in the queue
    pub async fn send(&self, event: ArEvent) -> Result<(), DispatchError> {
        self.tx
            .send(Command::Event(event))
            .await
            .map_err(|_| DispatchError::Closed)
    }

    /// Enqueue without waiting; for producers that must not stall (frame callbacks)
    pub fn try_send(&self, event: ArEvent) -> Result<(), DispatchError> {
        self.tx.try_send(Command::Event(event)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::Full,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }

    /// Enqueue from a plain OS thread outside the runtime
    pub fn blocking_send(&self, event: ArEvent) -> Result<(), DispatchError> {
        self.tx
            .blocking_send(Command::Event(event))
            .map_err(|_| DispatchError::Closed)
    }

    /// Wait until every event enqueued before this call has been handled
    pub async fn barrier(&self) -> Result<(), DispatchError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Command::Barrier(done_tx))
            .await
            .map_err(|_| DispatchError::Closed)?;
        done_rx.await.map_err(|_| DispatchError::Closed)
    }

    /// Subscribe to controller notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Runs a [`PlacementController`] on its own task
pub struct Dispatcher;

impl Dispatcher {
    /// Move the controller onto a dedicated task. The task ends once every
    /// handle is dropped and hands the controller back through the join handle.
    pub fn spawn<E>(
        controller: PlacementController<E>,
        capacity: usize,
    ) -> (DispatcherHandle, JoinHandle<PlacementController<E>>)
    where
        E: ArEngine + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        let task = tokio::spawn(run(controller, rx, notifications.clone()));
        (DispatcherHandle { tx, notifications }, task)
    }
}

async fn run<E: ArEngine>(
    mut controller: PlacementController<E>,
    mut rx: mpsc::Receiver<Command>,
    notifications: broadcast::Sender<Notification>,
) -> PlacementController<E> {
    info!(state = %controller.state(), "Event dispatcher started");
    let mut handled: u64 = 0;

    while let Some(command) = rx.recv().await {
        match command {
            Command::Event(event) => {
                let name = event.name();
                let changes = controller.handle(event);
                trace!(event = name, changes = changes.len(), "Handled event");
                for change in changes {
                    // No subscribers is fine
                    let _ = notifications.send(change);
                }
                handled += 1;
            }
            Command::Barrier(done) => {
                debug!(handled, "Barrier reached");
                let _ = done.send(());
            }
        }
    }

    info!(handled, state = %controller.state(), "Event dispatcher stopped");
    controller
}
