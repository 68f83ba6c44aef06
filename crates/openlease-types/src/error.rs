//! Error types for the OpenLease settlement layer.
//!
//! All errors use the `OL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Store errors (encoding, keys, backing storage)
//! - 2xx: Transaction validation
//! - 3xx: Worker backpressure
//! - 4xx: Signing / broadcast
//! - 9xx: General / internal errors

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse rejection code returned for a transaction that fails a precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectCode {
    /// The envelope could not be decoded.
    Malformed,
    /// The signature does not verify against the embedded public key.
    InvalidSignature,
    /// The nonce is not greater than the signer's current nonce.
    InvalidNonce,
    /// A precondition on ledger state failed.
    InvalidTransaction,
}

impl fmt::Display for RejectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "MALFORMED"),
            Self::InvalidSignature => write!(f, "INVALID_SIGNATURE"),
            Self::InvalidNonce => write!(f, "INVALID_NONCE"),
            Self::InvalidTransaction => write!(f, "INVALID_TRANSACTION"),
        }
    }
}

/// Central error enum for all OpenLease operations.
#[derive(Debug, Error)]
pub enum OpenleaseError {
    // =================================================================
    // Store Errors (1xx)
    // =================================================================
    /// A stored value could not be decoded into its entity type.
    #[error("OL_ERR_100: Decode failed for {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    /// An entity could not be encoded for storage.
    #[error("OL_ERR_101: Encode failed for {what}: {reason}")]
    Encode { what: &'static str, reason: String },

    /// A key or ID did not have the expected layout.
    #[error("OL_ERR_102: Invalid key: {reason}")]
    InvalidKey { reason: String },

    /// An entity that ledger invariants require is absent.
    #[error("OL_ERR_103: Missing {kind}: {id}")]
    MissingEntity { kind: &'static str, id: String },

    /// The backing store failed.
    #[error("OL_ERR_104: Backing store error: {0}")]
    Backing(String),

    /// A range proof does not match the claimed root or entries.
    #[error("OL_ERR_105: Invalid proof: {0}")]
    InvalidProof(String),

    // =================================================================
    // Validation Errors (2xx)
    // =================================================================
    /// A transaction failed a precondition. Never fatal.
    #[error("OL_ERR_200: Transaction rejected ({code}): {reason}")]
    Rejected { code: RejectCode, reason: String },

    // =================================================================
    // Worker Errors (3xx)
    // =================================================================
    /// A run is already in flight; the caller should wait for the next trigger.
    #[error("OL_ERR_300: Worker busy, run dropped")]
    Overflow,

    /// The worker has been cancelled and accepts no more runs.
    #[error("OL_ERR_301: Worker closed")]
    WorkerClosed,

    // =================================================================
    // Signing / Broadcast Errors (4xx)
    // =================================================================
    /// Building or signing a transaction envelope failed.
    #[error("OL_ERR_400: Signing failed: {0}")]
    Signing(String),

    /// Handing a signed transaction to the broadcast client failed.
    #[error("OL_ERR_401: Broadcast failed: {0}")]
    Broadcast(String),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("OL_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Configuration error (invalid config file, out-of-range values, etc.).
    #[error("OL_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OpenleaseError>;

impl OpenleaseError {
    /// Shorthand for a [`RejectCode::InvalidTransaction`] rejection.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Rejected {
            code: RejectCode::InvalidTransaction,
            reason: reason.into(),
        }
    }

    /// Whether this error is a validation rejection rather than a failure
    /// that must abort the current transition step.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
