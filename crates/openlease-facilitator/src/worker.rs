//! Single-slot background runner.
//!
//! ```text
//!   run(snapshot) ── busy? ──yes──▶ Err(Overflow)        never blocks
//!        │ no
//!        ▼
//!   [ slot, capacity 1 ] ──▶ task ──▶ spawn_blocking(runner.run) ──▶ busy = false
//! ```
//!
//! At most one run is queued or in flight at any time. After cancellation
//! the task exits and every later `run` fails with `WorkerClosed`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use openlease_state::{KvRead, Snapshot};
use openlease_types::{OpenleaseError, Result, constants::WORKER_CAPACITY};

use crate::StateRunner;

pub struct Worker {
    slot: mpsc::Sender<Snapshot>,
    busy: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl Worker {
    /// Start the background task on the current tokio runtime.
    pub fn spawn<R: StateRunner + 'static>(
        runner: R,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (slot, rx) = mpsc::channel(WORKER_CAPACITY);
        let busy = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(process(
            Arc::new(runner),
            rx,
            Arc::clone(&busy),
            cancel.clone(),
        ));
        (Self { slot, busy, cancel }, task)
    }

    /// Whether a run is queued or in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.slot.is_closed()
    }

    /// Stop the background task. In-flight runs finish; nothing new starts.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Queue a run without waiting.
    pub fn run(&self, snapshot: Snapshot) -> Result<()> {
        if self.is_closed() {
            return Err(OpenleaseError::WorkerClosed);
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(version = snapshot.version(), "worker busy, run dropped");
            return Err(OpenleaseError::Overflow);
        }
        match self.slot.try_send(snapshot) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(OpenleaseError::Overflow),
            Err(TrySendError::Closed(_)) => {
                self.busy.store(false, Ordering::Release);
                Err(OpenleaseError::WorkerClosed)
            }
        }
    }
}

impl StateRunner for Worker {
    fn run(&self, snapshot: Snapshot) -> Result<()> {
        Worker::run(self, snapshot)
    }
}

async fn process<R: StateRunner + 'static>(
    runner: Arc<R>,
    mut rx: mpsc::Receiver<Snapshot>,
    busy: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    loop {
        let snapshot = tokio::select! {
            () = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(s) => s,
                None => break,
            },
        };
        let version = snapshot.version();
        let runner = Arc::clone(&runner);
        match tokio::task::spawn_blocking(move || runner.run(snapshot)).await {
            Ok(Ok(())) => debug!(version, "worker run finished"),
            Ok(Err(err)) => warn!(version, error = %err, "worker run failed"),
            Err(err) => error!(version, error = %err, "worker run panicked"),
        }
        busy.store(false, Ordering::Release);
    }
    rx.close();
    info!("worker stopped");
}
