//! On-chain reads for the vouch reputation engine.
//!
//! The rest of the workspace depends only on the [`ChainReader`] trait;
//! [`JsonRpcChainReader`] is the production implementation against an
//! Ethereum JSON-RPC endpoint, and [`null::NullChainReader`] is the
//! deterministic test double.

pub mod error;
pub mod null;
pub mod og;
pub mod reader;
pub mod resolver;
pub mod rpc;

pub use error::ChainError;
pub use og::check_early_holder;
pub use reader::{ChainReader, TransferEvent};
pub use resolver::{EligibilityResolver, Resolution, ResolverConfig};
pub use rpc::JsonRpcChainReader;
