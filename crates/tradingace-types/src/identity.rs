//! Identity types for TradingAce
//!
//! Database-assigned identifiers are wrapped in newtypes so a task id can
//! never be passed where a campaign id is expected. Users are identified by
//! their chain address, normalized to lower-case hex.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{CampaignError, CampaignResult};

/// Macro to generate integer ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the raw database value
            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

define_id_type!(CampaignId, "Identifier of a reward campaign");
define_id_type!(TaskId, "Identifier of a task within a campaign");
define_id_type!(UserTaskId, "Identifier of a user's progress record on one task");

/// A user's chain address, always stored as lower-case `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserAddress(String);

impl UserAddress {
    /// Parse and normalize an address string (with or without `0x`, any case)
    pub fn parse(s: &str) -> CampaignResult<Self> {
        let address = Address::from_str(s.trim())
            .map_err(|e| CampaignError::InvalidAddress(format!("{}: {}", s, e)))?;
        Ok(Self::from(address))
    }

    /// The normalized string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a value that is already known to be normalized, such as a
    /// column written by this crate.
    pub fn from_normalized(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl From<Address> for UserAddress {
    fn from(address: Address) -> Self {
        Self(format!("0x{}", hex::encode(address.as_slice())))
    }
}

impl FromStr for UserAddress {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for UserAddress {
    type Error = CampaignError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<UserAddress> for String {
    fn from(address: UserAddress) -> Self {
        address.0
    }
}

impl AsRef<str> for UserAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_case_normalized() {
        let upper = UserAddress::parse("0xAbCdEf0123456789aBcDeF0123456789AbCdEf01").unwrap();
        let lower = UserAddress::parse("abcdef0123456789abcdef0123456789abcdef01").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn test_invalid_address() {
        assert!(matches!(
            UserAddress::parse("0x1234"),
            Err(CampaignError::InvalidAddress(_))
        ));
        assert!(UserAddress::parse("not-an-address").is_err());
    }

    #[test]
    fn test_address_serde_roundtrip_normalizes() {
        let json = "\"0xABCDEF0123456789ABCDEF0123456789ABCDEF01\"";
        let address: UserAddress = serde_json::from_str(json).unwrap();
        assert_eq!(
            serde_json::to_string(&address).unwrap(),
            "\"0xabcdef0123456789abcdef0123456789abcdef01\""
        );
    }

    #[test]
    fn test_id_display() {
        assert_eq!(TaskId(42).to_string(), "42");
        assert_eq!(CampaignId::from(7).get(), 7);
    }
}
