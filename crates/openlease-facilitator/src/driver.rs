//! Leader detection.
//!
//! ```text
//!   on_begin_block(ann) ──▶ pending = Some(ann)
//!   on_commit(snapshot) ──▶ ann = pending.take()
//!                           ann.producer == actor && ann.height == snapshot.version
//!                             ? runner.run(snapshot) : skip
//! ```
//!
//! The announcement is cleared on every commit, whatever the outcome, so a
//! stale announcement can never fire a second run.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use openlease_state::{KvRead, Snapshot};
use openlease_types::{Address, Result};

use crate::StateRunner;

/// The block that just began and who produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockAnnouncement {
    pub producer: Address,
    /// Version the block will commit as.
    pub height: u64,
}

impl BlockAnnouncement {
    #[must_use]
    pub fn new(producer: Address, height: u64) -> Self {
        Self { producer, height }
    }
}

/// Block lifecycle notifications from the consensus engine.
#[derive(Debug, Clone)]
pub enum BlockNotification {
    Begin(BlockAnnouncement),
    Commit(Snapshot),
}

pub struct Driver<R> {
    actor: Address,
    runner: R,
    pending: Mutex<Option<BlockAnnouncement>>,
}

impl<R: StateRunner> Driver<R> {
    pub fn new(actor: Address, runner: R) -> Self {
        Self {
            actor,
            runner,
            pending: Mutex::new(None),
        }
    }

    pub fn actor(&self) -> Address {
        self.actor
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The announcement waiting for its commit, if any.
    pub fn pending(&self) -> Option<BlockAnnouncement> {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn on_begin_block(&self, announcement: BlockAnnouncement) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(stale) = pending.replace(announcement) {
            debug!(height = stale.height, "replacing uncommitted announcement");
        }
    }

    /// Run once if this node produced the block being committed.
    ///
    /// Returns whether the runner was invoked.
    pub fn on_commit(&self, snapshot: Snapshot) -> Result<bool> {
        let announcement = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let version = snapshot.version();
        match announcement {
            None => {
                debug!(version, "commit without announcement, skipping");
                Ok(false)
            }
            Some(ann) if ann.producer != self.actor => {
                debug!(version, producer = %ann.producer.short(), "not our block, skipping");
                Ok(false)
            }
            Some(ann) if ann.height != version => {
                debug!(version, announced = ann.height, "stale announcement, skipping");
                Ok(false)
            }
            Some(_) => {
                self.runner.run(snapshot)?;
                Ok(true)
            }
        }
    }

    /// Consume notifications until cancelled or the channel closes.
    ///
    /// `on_commit` runs inline, so a slow runner should sit behind a
    /// [`Worker`](crate::Worker).
    pub async fn run(&self, mut rx: mpsc::Receiver<BlockNotification>, cancel: CancellationToken) {
        info!(actor = %self.actor.short(), "driver started");
        loop {
            let notification = tokio::select! {
                () = cancel.cancelled() => break,
                next = rx.recv() => match next {
                    Some(n) => n,
                    None => break,
                },
            };
            match notification {
                BlockNotification::Begin(ann) => self.on_begin_block(ann),
                BlockNotification::Commit(snapshot) => {
                    if let Err(err) = self.on_commit(snapshot) {
                        warn!(error = %err, "facilitator run failed");
                    }
                }
            }
        }
        info!(actor = %self.actor.short(), "driver stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use openlease_state::MerkleStore;

    use super::*;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl StateRunner for Counter {
        fn run(&self, _snapshot: Snapshot) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    const ME: Address = Address([1u8; 32]);
    const OTHER: Address = Address([2u8; 32]);

    fn committed(version: u64) -> Snapshot {
        let mut store = MerkleStore::new(8);
        for _ in 0..version {
            store.commit();
        }
        store.snapshot()
    }

    fn runs(driver: &Driver<Counter>) -> usize {
        driver.runner().0.load(Ordering::SeqCst)
    }

    #[test]
    fn fires_only_for_own_block() {
        let driver = Driver::new(ME, Counter::default());
        driver.on_begin_block(BlockAnnouncement::new(OTHER, 1));
        assert!(!driver.on_commit(committed(1)).unwrap());
        driver.on_begin_block(BlockAnnouncement::new(ME, 2));
        assert!(driver.on_commit(committed(2)).unwrap());
        assert_eq!(runs(&driver), 1);
    }

    #[test]
    fn at_most_once_per_announcement() {
        let driver = Driver::new(ME, Counter::default());
        driver.on_begin_block(BlockAnnouncement::new(ME, 1));
        assert!(driver.on_commit(committed(1)).unwrap());
        assert!(driver.pending().is_none());
        assert!(!driver.on_commit(committed(1)).unwrap());
        assert_eq!(runs(&driver), 1);
    }

    #[test]
    fn announcement_cleared_after_every_commit() {
        let driver = Driver::new(ME, Counter::default());
        for (producer, version) in [(OTHER, 1), (ME, 5), (ME, 3)] {
            driver.on_begin_block(BlockAnnouncement::new(producer, version));
            let _ = driver.on_commit(committed(3)).unwrap();
            assert!(driver.pending().is_none());
        }
        // Only the (ME, 3) announcement matched the committed version.
        assert_eq!(runs(&driver), 1);
    }

    #[test]
    fn commit_without_begin_is_skipped() {
        let driver = Driver::new(ME, Counter::default());
        assert!(!driver.on_commit(committed(0)).unwrap());
        assert_eq!(runs(&driver), 0);
    }

    #[tokio::test]
    async fn run_loop_follows_notifications_until_cancelled() {
        let driver = std::sync::Arc::new(Driver::new(ME, Counter::default()));
        let (tx, rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let task = {
            let driver = std::sync::Arc::clone(&driver);
            let cancel = cancel.clone();
            tokio::spawn(async move { driver.run(rx, cancel).await })
        };

        tx.send(BlockNotification::Begin(BlockAnnouncement::new(ME, 1)))
            .await
            .unwrap();
        tx.send(BlockNotification::Commit(committed(1))).await.unwrap();
        tx.send(BlockNotification::Commit(committed(1))).await.unwrap();
        drop(tx);
        task.await.unwrap();
        assert_eq!(runs(&driver), 1);

        let (_tx, rx) = mpsc::channel(1);
        cancel.cancel();
        driver.run(rx, cancel).await;
    }
}
