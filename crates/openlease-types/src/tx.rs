//! Transaction payloads, signed envelopes and pipeline responses.
//!
//! A payload is one variant of [`TxPayload`]; the pipeline dispatches on the
//! variant to exactly one handler. The envelope binds the payload to a nonce
//! and an ed25519 key:
//!
//! ```text
//! signing bytes = "openlease:tx:v1:" || nonce (LE u64) || json(payload)
//! ```

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{
    Address, CloseReason, LeaseId, MarketEvent, OpenleaseError, OrderId, RejectCode, Result,
    constants::TX_SIGNING_DOMAIN,
};

/// Open a new order for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxCreateOrder {
    pub id: OrderId,
    pub end_at: u64,
}

/// Bind an order to its winning fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxCreateLease {
    pub id: LeaseId,
    pub price: u64,
}

/// Close a deployment and everything hanging off it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxCloseDeployment {
    pub deployment: Address,
    pub reason: CloseReason,
}

/// Every transaction kind the market pipeline understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TxPayload {
    CreateOrder(TxCreateOrder),
    CreateLease(TxCreateLease),
    CloseDeployment(TxCloseDeployment),
}

impl TxPayload {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateOrder(_) => "create-order",
            Self::CreateLease(_) => "create-lease",
            Self::CloseDeployment(_) => "close-deployment",
        }
    }
}

/// Canonical bytes covered by the envelope signature.
pub fn signing_bytes(payload: &TxPayload, nonce: u64) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(payload).map_err(|e| OpenleaseError::Encode {
        what: "tx payload",
        reason: e.to_string(),
    })?;
    let mut out = Vec::with_capacity(TX_SIGNING_DOMAIN.len() + 8 + body.len());
    out.extend_from_slice(TX_SIGNING_DOMAIN);
    out.extend_from_slice(&nonce.to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// A signed transaction envelope: payload + nonce + public key + signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub payload: TxPayload,
    pub nonce: u64,
    pub public_key: [u8; 32],
    pub signature: Vec<u8>,
}

impl SignedTx {
    /// Address of the key that signed this envelope.
    #[must_use]
    pub fn signer(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    /// Verify the signature over [`signing_bytes`].
    pub fn verify(&self) -> Result<()> {
        let reject = |reason: String| OpenleaseError::Rejected {
            code: RejectCode::InvalidSignature,
            reason,
        };
        let key = VerifyingKey::from_bytes(&self.public_key)
            .map_err(|e| reject(format!("bad public key: {e}")))?;
        let sig = Signature::from_slice(&self.signature)
            .map_err(|e| reject(format!("bad signature: {e}")))?;
        let msg = signing_bytes(&self.payload, self.nonce)?;
        key.verify(&msg, &sig)
            .map_err(|e| reject(format!("signature mismatch: {e}")))
    }

    /// Wire encoding handed to the broadcast client.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| OpenleaseError::Encode {
            what: "signed tx",
            reason: e.to_string(),
        })
    }

    /// Decode wire bytes. A malformed envelope is a rejection, not a failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| OpenleaseError::Rejected {
            code: RejectCode::Malformed,
            reason: e.to_string(),
        })
    }
}

/// Outcome class of a transaction in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxCode {
    Ok,
    Rejected(RejectCode),
    /// The step aborted on a store or internal failure.
    Error,
}

/// Structured result of `check_tx` / `deliver_tx`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResponse {
    pub code: TxCode,
    pub log: String,
    pub events: Vec<MarketEvent>,
}

impl TxResponse {
    #[must_use]
    pub fn ok(events: Vec<MarketEvent>) -> Self {
        Self {
            code: TxCode::Ok,
            log: String::new(),
            events,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == TxCode::Ok
    }
}

impl From<OpenleaseError> for TxResponse {
    fn from(err: OpenleaseError) -> Self {
        let code = match &err {
            OpenleaseError::Rejected { code, .. } => TxCode::Rejected(*code),
            _ => TxCode::Error,
        };
        Self {
            code,
            log: err.to_string(),
            events: Vec::new(),
        }
    }
}
