//! Ranked token collection configuration.
//!
//! A wallet's voting weight is the weight of the highest-ranked collection
//! it holds at least one token of. The set is static configuration loaded
//! at process start; resolution always scans every collection and takes the
//! maximum, never first-match, so reordering the table cannot change results.

use crate::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One token collection and the voting weight it confers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    /// Voting weight for holders of this collection. Always > 0.
    pub weight: u32,
    /// ERC-721 contract address.
    pub address: Address,
}

/// Why a collection table was rejected at load time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectionSetError {
    #[error("collection set must not be empty")]
    Empty,

    #[error("collection {0:?} has zero weight")]
    ZeroWeight(String),

    #[error("duplicate contract address {0}")]
    DuplicateAddress(Address),
}

/// The validated, ranked set of collections.
///
/// Kept sorted by descending weight for display purposes only. Built only
/// through [`CollectionSet::new`] so the validation invariants always hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionSet {
    collections: Vec<Collection>,
}

impl CollectionSet {
    /// Validate and build a collection set.
    pub fn new(mut collections: Vec<Collection>) -> Result<Self, CollectionSetError> {
        if collections.is_empty() {
            return Err(CollectionSetError::Empty);
        }
        for c in &collections {
            if c.weight == 0 {
                return Err(CollectionSetError::ZeroWeight(c.name.clone()));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for c in &collections {
            if !seen.insert(c.address.clone()) {
                return Err(CollectionSetError::DuplicateAddress(c.address.clone()));
            }
        }
        collections.sort_by(|a, b| b.weight.cmp(&a.weight));
        Ok(Self { collections })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.iter()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// The highest weight any single collection confers.
    pub fn max_weight(&self) -> u32 {
        self.collections.iter().map(|c| c.weight).max().unwrap_or(0)
    }

    /// The production collection table.
    pub fn mainnet_defaults() -> Self {
        fn c(name: &str, weight: u32, address: &str) -> Collection {
            Collection {
                name: name.to_string(),
                weight,
                address: Address::parse(address).expect("static address is valid"),
            }
        }
        Self::new(vec![
            c("Bonkler", 10, "0xABFaE8A54e6817F57F9De7796044E9a60e61ad67"),
            c("Milady Maker", 7, "0x5af0d9827e0c53e4799bb226655a1de152a425a5"),
            c("Redacted Remilio Babies", 5, "0xd3d9ddd0cf0a5f0bfb8f7fceae075df687eaebab"),
            c("Schizoposters", 4, "0xbfe47d6d4090940d1c7a0066b63d23875e3e2ac5"),
            c("YAYO", 3, "0x09f66a094a0070ebddefa192a33fa5d75b59d46b"),
            c("Radbro Webring V2", 2, "0xabcdb5710b88f456fed1e99025379e2969f29610"),
            c("Pixelady Maker", 2, "0x8fc0d90f2c45a5e7f94904075c952e0943cfccfd"),
            c("Milady Fumo Babies", 2, "0x773ac90d0c605ec3beb49a0a971240400319e577"),
            c("Kagami Academy", 2, "0x4cc2c3518b1a5b782fa6c5bde80b7388fd8c674f"),
            c("Radbro Webring: Radcats", 1, "0x3bfc3134645ebe0393f90d6a19bcb20bd732964f"),
        ])
        .expect("default collection table is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(seed: u8) -> Address {
        Address::parse(&format!("0x{:040x}", seed)).unwrap()
    }

    #[test]
    fn empty_set_rejected() {
        assert_eq!(CollectionSet::new(vec![]).unwrap_err(), CollectionSetError::Empty);
    }

    #[test]
    fn zero_weight_rejected() {
        let err = CollectionSet::new(vec![Collection {
            name: "Worthless".into(),
            weight: 0,
            address: addr(1),
        }])
        .unwrap_err();
        assert_eq!(err, CollectionSetError::ZeroWeight("Worthless".into()));
    }

    #[test]
    fn duplicate_address_rejected() {
        let err = CollectionSet::new(vec![
            Collection { name: "A".into(), weight: 2, address: addr(1) },
            Collection { name: "B".into(), weight: 5, address: addr(1) },
        ])
        .unwrap_err();
        assert_eq!(err, CollectionSetError::DuplicateAddress(addr(1)));
    }

    #[test]
    fn sorted_descending_by_weight() {
        let set = CollectionSet::new(vec![
            Collection { name: "Low".into(), weight: 1, address: addr(1) },
            Collection { name: "High".into(), weight: 9, address: addr(2) },
            Collection { name: "Mid".into(), weight: 4, address: addr(3) },
        ])
        .unwrap();
        let weights: Vec<u32> = set.iter().map(|c| c.weight).collect();
        assert_eq!(weights, vec![9, 4, 1]);
        assert_eq!(set.max_weight(), 9);
    }

    #[test]
    fn mainnet_defaults_are_valid() {
        let set = CollectionSet::mainnet_defaults();
        assert_eq!(set.len(), 10);
        assert_eq!(set.max_weight(), 10);
    }
}
