//! Raw 32-byte addresses shared by accounts, deployments and providers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::{OpenleaseError, Result, constants::ADDRESS_LEN};

/// A fixed-width ledger address.
///
/// The fixed width is what makes composite keys parseable without length
/// prefixes, and what gives range scans their `MIN`/`MAX` sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// All-zero address, the lower sentinel of "every address" scans.
    pub const MIN: Self = Self([0u8; ADDRESS_LEN]);

    /// All-`0xff` address, the upper sentinel of "every address" scans.
    pub const MAX: Self = Self([0xffu8; ADDRESS_LEN]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice, failing unless it is exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; ADDRESS_LEN] =
            bytes
                .try_into()
                .map_err(|_| OpenleaseError::InvalidKey {
                    reason: format!("address must be {ADDRESS_LEN} bytes, got {}", bytes.len()),
                })?;
        Ok(Self(raw))
    }

    /// Address controlled by an ed25519 public key: `SHA-256(pubkey)`.
    #[must_use]
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let digest = Sha256::digest(public_key);
        let mut raw = [0u8; ADDRESS_LEN];
        raw.copy_from_slice(&digest);
        Self(raw)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// First four bytes in hex, for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = OpenleaseError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| OpenleaseError::InvalidKey {
            reason: format!("bad address hex {s:?}: {e}"),
        })?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    /// A random address.
    pub fn random() -> Self {
        Self(rand::random::<[u8; ADDRESS_LEN]>())
    }

    /// An address whose every byte is `b`; handy for deterministic ordering.
    pub fn repeat(b: u8) -> Self {
        Self([b; ADDRESS_LEN])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_display_and_parse() {
        let addr = Address::repeat(0xab);
        let s = addr.to_string();
        assert_eq!(s.len(), 64);
        assert_eq!(s.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_rejects_wrong_width() {
        let err = "abcd".parse::<Address>().unwrap_err();
        assert!(matches!(err, OpenleaseError::InvalidKey { .. }));
    }

    #[test]
    fn sentinels_bound_everything() {
        let addr = Address::random();
        assert!(Address::MIN <= addr && addr <= Address::MAX);
    }

    #[test]
    fn public_key_address_is_stable() {
        let pk = [7u8; 32];
        assert_eq!(Address::from_public_key(&pk), Address::from_public_key(&pk));
        assert_ne!(Address::from_public_key(&pk), Address::from_public_key(&[8u8; 32]));
    }

    #[test]
    fn serde_as_hex_string() {
        let addr = Address::repeat(1);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{addr}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }
}
