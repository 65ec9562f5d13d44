//! Abstract storage traits for the vouch reputation engine.
//!
//! Every storage backend (the in-memory store, a document database adapter)
//! implements these traits. The engine depends only on the traits, which is
//! what lets tests substitute a deterministic in-memory store.

pub mod error;
pub mod target;

pub use error::StoreError;
pub use target::{
    Page, TargetFilter, TargetRecord, TargetSort, TargetState, TargetStore,
};
