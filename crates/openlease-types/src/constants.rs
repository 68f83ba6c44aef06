//! System-wide constants for the OpenLease settlement layer.

/// Width of every raw address (accounts, deployments, providers).
pub const ADDRESS_LEN: usize = 32;

/// Width of one big-endian sequence component inside a composite ID.
pub const SEQ_LEN: usize = 8;

/// Store key prefix for accounts: `/accounts/{address}`.
pub const ACCOUNT_PREFIX: &[u8] = b"/accounts/";

/// Store key prefix for deployments: `/deployments/{address}`.
pub const DEPLOYMENT_PREFIX: &[u8] = b"/deployments/";

/// Store key prefix for per-deployment order sequences.
pub const DEPLOYMENT_SEQUENCE_PREFIX: &[u8] = b"/deployments-seq/";

/// Store key prefix for groups: `/deployment-groups/{deployment}{group-seq}`.
pub const GROUP_PREFIX: &[u8] = b"/deployment-groups/";

/// Store key prefix for providers: `/providers/{address}`.
pub const PROVIDER_PREFIX: &[u8] = b"/providers/";

/// Store key prefix for orders: `/orders/{deployment}{group-seq}{order-seq}`.
pub const ORDER_PREFIX: &[u8] = b"/orders/";

/// Store key prefix for fulfillments:
/// `/fulfillments/{deployment}{group-seq}{order-seq}{provider}`.
pub const FULFILLMENT_PREFIX: &[u8] = b"/fulfillments/";

/// Store key prefix for leases (same composite ID as the winning fulfillment).
pub const LEASE_PREFIX: &[u8] = b"/leases/";

/// Range limit meaning "no limit".
pub const MAX_RANGE_LIMIT: usize = usize::MAX;

/// Default number of committed versions the store keeps for historical reads.
pub const DEFAULT_KEEP_RECENT: u64 = 100;

/// Nonce assumed for the facilitator account before it exists on chain.
pub const DEFAULT_FACILITATOR_NONCE: u64 = 1;

/// The worker accepts at most this many in-flight runs.
pub const WORKER_CAPACITY: usize = 1;

/// Domain tag prepended to transaction signing bytes.
pub const TX_SIGNING_DOMAIN: &[u8] = b"openlease:tx:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
