//! Configuration types for OpenLease nodes.

use serde::{Deserialize, Serialize};

use crate::{OpenleaseError, Result, constants};

/// Configuration for a single OpenLease node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub store: StoreConfig,
    pub market: MarketConfig,
    pub facilitator: FacilitatorConfig,
}

/// Versioned store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Committed versions retained for historical reads.
    pub keep_recent: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            keep_recent: constants::DEFAULT_KEEP_RECENT,
        }
    }
}

/// Market-wide knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Upper bound on entries returned by a single range query.
    pub max_range_limit: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            max_range_limit: constants::MAX_RANGE_LIMIT,
        }
    }
}

/// Leader-only facilitator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilitatorConfig {
    /// Whether this node runs the facilitator at all.
    pub enabled: bool,
    /// Nonce assumed while the facilitator account does not exist yet.
    pub default_nonce: u64,
}

impl Default for FacilitatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_nonce: constants::DEFAULT_FACILITATOR_NONCE,
        }
    }
}

impl NodeConfig {
    /// Parse a JSON config document; missing sections fall back to defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| OpenleaseError::Configuration(format!("invalid JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.keep_recent == 0 {
            return Err(OpenleaseError::Configuration(
                "store.keep_recent must be at least 1".into(),
            ));
        }
        if self.market.max_range_limit == 0 {
            return Err(OpenleaseError::Configuration(
                "market.max_range_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_constants() {
        let cfg = NodeConfig::default();
        assert_eq!(cfg.store.keep_recent, constants::DEFAULT_KEEP_RECENT);
        assert_eq!(cfg.market.max_range_limit, constants::MAX_RANGE_LIMIT);
        assert_eq!(cfg.facilitator.default_nonce, 1);
        assert!(cfg.facilitator.enabled);
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = NodeConfig::from_json_str(r#"{"facilitator":{"enabled":false}}"#).unwrap();
        assert!(!cfg.facilitator.enabled);
        assert_eq!(cfg.facilitator.default_nonce, constants::DEFAULT_FACILITATOR_NONCE);
        assert_eq!(cfg.market, MarketConfig::default());
        assert_eq!(cfg.store, StoreConfig::default());
    }

    #[test]
    fn zero_keep_recent_is_rejected() {
        let err = NodeConfig::from_json_str(r#"{"store":{"keep_recent":0}}"#).unwrap_err();
        assert!(err.to_string().starts_with("OL_ERR_902"));
    }

    #[test]
    fn garbage_is_a_configuration_error() {
        let err = NodeConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, OpenleaseError::Configuration(_)));
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = NodeConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(NodeConfig::from_json_str(&json).unwrap(), cfg);
    }
}
