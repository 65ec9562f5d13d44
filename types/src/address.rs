//! Ethereum address type with `0x` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An EVM address: `0x` followed by 40 hex characters.
///
/// Stored lowercase so that equality and map keys are case-insensitive.
/// Used for both wallets (voters) and token collection contracts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

/// Why an address string was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("address must be 42 characters, got {0}")]
    BadLength(usize),

    #[error("address contains non-hex characters")]
    NotHex,
}

impl Address {
    /// The standard prefix for all EVM addresses.
    pub const PREFIX: &'static str = "0x";

    /// Number of hex characters after the prefix.
    const HEX_LEN: usize = 40;

    /// Parse and normalize an address. Voter addresses arrive from
    /// untrusted callers, so this is fallible rather than panicking.
    pub fn parse(raw: &str) -> Result<Self, AddressParseError> {
        if !raw.starts_with(Self::PREFIX) {
            return Err(AddressParseError::MissingPrefix);
        }
        if raw.len() != Self::PREFIX.len() + Self::HEX_LEN {
            return Err(AddressParseError::BadLength(raw.len()));
        }
        let hex_part = &raw[Self::PREFIX.len()..];
        if hex::decode(hex_part).is_err() {
            return Err(AddressParseError::NotHex);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Return the full address string, including the `0x` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 40 hex characters without the prefix.
    pub fn hex_part(&self) -> &str {
        &self.0[Self::PREFIX.len()..]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_lowercases() {
        let addr = Address::parse("0x5Af0D9827E0c53E4799BB226655A1de152A425a5").unwrap();
        assert_eq!(addr.as_str(), "0x5af0d9827e0c53e4799bb226655a1de152a425a5");
    }

    #[test]
    fn rejects_missing_prefix() {
        let err = Address::parse("5af0d9827e0c53e4799bb226655a1de152a425a5").unwrap_err();
        assert_eq!(err, AddressParseError::MissingPrefix);
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            Address::parse("0x1234").unwrap_err(),
            AddressParseError::BadLength(6)
        );
    }

    #[test]
    fn rejects_non_hex() {
        let err = Address::parse("0xzzf0d9827e0c53e4799bb226655a1de152a425a5").unwrap_err();
        assert_eq!(err, AddressParseError::NotHex);
    }

    #[test]
    fn mixed_case_addresses_compare_equal() {
        let a = Address::parse("0xABFaE8A54e6817F57F9De7796044E9a60e61ad67").unwrap();
        let b = Address::parse("0xabfae8a54e6817f57f9de7796044e9a60e61ad67").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn serde_rejects_invalid_on_deserialize() {
        let result: Result<Address, _> = serde_json::from_str("\"not-an-address\"");
        assert!(result.is_err());
    }
}
