//! The voting engine: validates vote requests, resolves voter eligibility
//! on-chain, and applies insert/replace/revoke semantics to target ledgers
//! with per-target optimistic concurrency.
//!
//! The engine is stateless between calls — all durable state lives behind
//! the [`vouch_store::TargetStore`] trait — so it can be replicated
//! horizontally behind any number of request handlers.

pub mod engine;
pub mod error;
pub mod ledger;

pub use engine::{
    EnrichmentRequest, RecheckOutcome, SubmissionOutcome, VotingEngine, MAX_CAS_ATTEMPTS,
};
pub use error::EngineError;
