//! Per-transaction execution context.

use openlease_types::Address;

/// What a handler knows about the transaction beyond its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    /// Address derived from the envelope's verified public key.
    pub signer: Address,
    /// Height of the last committed block the transaction executes on.
    pub height: u64,
}

impl TxContext {
    #[must_use]
    pub fn new(signer: Address, height: u64) -> Self {
        Self { signer, height }
    }
}
