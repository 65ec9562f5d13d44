//! Chain read errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    /// Every configured collection query failed; resolution could not
    /// produce a result. Safe for the caller to retry.
    #[error("chain unavailable: {0}")]
    Unavailable(String),

    /// The endpoint could not be reached (connect failure or timeout).
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// The endpoint answered with an error.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The endpoint answered with something we could not parse.
    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),
}
