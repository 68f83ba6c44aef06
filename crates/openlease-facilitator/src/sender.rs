//! Transaction sender: sign, broadcast, advance the nonce in memory.
//!
//! A `Sender` lives for one facilitator run and is seeded from the chain's
//! view of the actor's nonce. The on-chain nonce only moves once the
//! broadcast transactions are delivered, so within a run the next nonce is
//! tracked here instead of re-queried.

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use openlease_types::{OpenleaseError, Result, SignedTx, TxPayload, signing_bytes};

use crate::{BroadcastClient, Signer};

pub struct Sender<'a, S, C> {
    signer: &'a S,
    client: &'a C,
    nonce: Mutex<u64>,
}

impl<'a, S: Signer, C: BroadcastClient> Sender<'a, S, C> {
    /// `nonce` is the last nonce the actor is known to have used.
    pub fn new(signer: &'a S, client: &'a C, nonce: u64) -> Self {
        Self {
            signer,
            client,
            nonce: Mutex::new(nonce),
        }
    }

    /// Last nonce consumed (or the seed, before the first send).
    pub fn nonce(&self) -> u64 {
        *self.nonce.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sign `payload` with the next nonce and hand it to the client.
    ///
    /// Returns the nonce consumed. A signing failure leaves the nonce
    /// untouched; a broadcast failure does not give it back.
    pub fn send(&self, payload: TxPayload) -> Result<u64> {
        let mut nonce = self.nonce.lock().unwrap_or_else(PoisonError::into_inner);
        let next = nonce
            .checked_add(1)
            .ok_or_else(|| OpenleaseError::Signing("nonce exhausted".into()))?;

        let kind = payload.kind();
        let signature = self.signer.sign(&signing_bytes(&payload, next)?)?;
        let bytes = SignedTx {
            payload,
            nonce: next,
            public_key: self.signer.public_key(),
            signature,
        }
        .to_bytes()?;

        *nonce = next;
        self.client.broadcast(bytes)?;
        debug!(kind, nonce = next, "tx broadcast");
        Ok(next)
    }
}
