//! Read-only blockchain client abstraction.

use crate::ChainError;
use async_trait::async_trait;
use vouch_types::{Address, Timestamp};

/// One ERC-721 `Transfer` event received by a wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferEvent {
    /// Block the transfer was mined in. The block's timestamp is fetched
    /// separately via [`ChainReader::block_timestamp`].
    pub block_number: u64,
}

/// Read-only view of the chain.
///
/// Implementations hold no mutable shared state, so unlimited concurrent
/// calls are safe; callers throttle with their own concurrency cap to stay
/// inside external RPC rate limits.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// ERC-721 `balanceOf(wallet)` on `contract`, at the latest block.
    async fn balance_of(&self, contract: &Address, wallet: &Address)
        -> Result<u128, ChainError>;

    /// Number of the latest block.
    async fn latest_block(&self) -> Result<u64, ChainError>;

    /// Timestamp of a block by number.
    async fn block_timestamp(&self, block: u64) -> Result<Timestamp, ChainError>;

    /// `Transfer` events into `wallet` on `contract` within the inclusive
    /// block range. One bounded page of the historical scan; callers page
    /// by re-specifying ranges.
    async fn transfer_events_to(
        &self,
        contract: &Address,
        wallet: &Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, ChainError>;
}
