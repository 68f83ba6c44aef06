//! Broadcast capability.
//!
//! Submission is fire-and-forget: success means the bytes were handed
//! off, not that any node accepted them.

use tokio::sync::mpsc;

use openlease_types::{OpenleaseError, Result};

/// Submits raw signed transactions to the network.
pub trait BroadcastClient: Send + Sync {
    fn broadcast(&self, tx: Vec<u8>) -> Result<()>;
}

/// Hands transactions to an in-process channel; the receiving end feeds
/// the node's mempool (or a test).
#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelBroadcaster {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl BroadcastClient for ChannelBroadcaster {
    fn broadcast(&self, tx: Vec<u8>) -> Result<()> {
        self.tx
            .send(tx)
            .map_err(|_| OpenleaseError::Broadcast("receiver dropped".into()))
    }
}
