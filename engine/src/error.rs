use thiserror::Error;

use vouch_chain::ChainError;
use vouch_store::StoreError;
use vouch_types::AddressParseError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No target with that username exists.
    #[error("target not found: {0}")]
    TargetNotFound(String),

    /// The target is still pending enrichment and does not accept votes.
    #[error("target not ready: {0}")]
    TargetNotReady(String),

    /// The voter address is malformed.
    #[error("invalid voter address: {0}")]
    InvalidVoter(#[from] AddressParseError),

    /// The username is not a well-formed handle.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// The wallet holds no qualifying tokens; weight resolved to 0.
    #[error("wallet is not eligible to vote")]
    NotEligible,

    /// Eligibility could not be resolved. Safe for the caller to retry;
    /// no ledger mutation was performed.
    #[error("chain unavailable: {0}")]
    ChainUnavailable(#[from] ChainError),

    /// The conditional-write retry budget was exhausted under contention.
    /// Transient; safe for the caller to retry.
    #[error("conditional write conflict on target {0} after retries")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Whether the caller may safely retry the operation verbatim.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::ChainUnavailable(_) | EngineError::Conflict(_))
    }
}
