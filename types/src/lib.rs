//! Fundamental types for the vouch reputation engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: addresses, timestamps, votes, scores, and the ranked token
//! collection configuration.

pub mod address;
pub mod collection;
pub mod score;
pub mod time;
pub mod vote;

pub use address::{Address, AddressParseError};
pub use collection::{Collection, CollectionSet, CollectionSetError};
pub use score::{Score, Status};
pub use time::Timestamp;
pub use vote::{Vote, VoteDirection};
