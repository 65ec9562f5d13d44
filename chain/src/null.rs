//! Nullable chain reader — deterministic chain state for testing.
//!
//! Balances, block timestamps, and transfer events are scripted
//! programmatically; individual balance queries can be made to fail to
//! exercise retry and fail-open paths. Never touches the network.

use crate::reader::{ChainReader, TransferEvent};
use crate::ChainError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use vouch_types::{Address, Timestamp};

type ContractWallet = (Address, Address);

/// An in-memory chain reader with scripted state.
///
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullChainReader {
    balances: Mutex<HashMap<ContractWallet, u128>>,
    failing: Mutex<HashSet<ContractWallet>>,
    transfers: Mutex<HashMap<ContractWallet, Vec<u64>>>,
    block_times: Mutex<HashMap<u64, u64>>,
    latest: AtomicU64,
    balance_calls: AtomicU64,
    log_queries: AtomicU64,
}

impl NullChainReader {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            transfers: Mutex::new(HashMap::new()),
            block_times: Mutex::new(HashMap::new()),
            latest: AtomicU64::new(0),
            balance_calls: AtomicU64::new(0),
            log_queries: AtomicU64::new(0),
        }
    }

    /// Script a balance. Unscripted pairs read as balance 0.
    pub fn set_balance(&self, contract: &Address, wallet: &Address, balance: u128) {
        self.balances
            .lock()
            .unwrap()
            .insert((contract.clone(), wallet.clone()), balance);
    }

    /// Make every `balance_of` call for this pair fail.
    pub fn fail_balance(&self, contract: &Address, wallet: &Address) {
        self.failing
            .lock()
            .unwrap()
            .insert((contract.clone(), wallet.clone()));
    }

    /// Clear a scripted failure (e.g. to simulate recovery).
    pub fn heal_balance(&self, contract: &Address, wallet: &Address) {
        self.failing
            .lock()
            .unwrap()
            .remove(&(contract.clone(), wallet.clone()));
    }

    pub fn set_latest_block(&self, block: u64) {
        self.latest.store(block, Ordering::SeqCst);
    }

    pub fn set_block_timestamp(&self, block: u64, secs: u64) {
        self.block_times.lock().unwrap().insert(block, secs);
    }

    /// Script a transfer of a `contract` token into `wallet` at `block`.
    pub fn add_transfer(&self, contract: &Address, wallet: &Address, block: u64) {
        self.transfers
            .lock()
            .unwrap()
            .entry((contract.clone(), wallet.clone()))
            .or_default()
            .push(block);
    }

    /// Number of `balance_of` calls made so far (retries included).
    pub fn balance_calls(&self) -> u64 {
        self.balance_calls.load(Ordering::SeqCst)
    }

    /// Number of `transfer_events_to` pages fetched so far.
    pub fn log_queries(&self) -> u64 {
        self.log_queries.load(Ordering::SeqCst)
    }
}

impl Default for NullChainReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainReader for NullChainReader {
    async fn balance_of(&self, contract: &Address, wallet: &Address)
        -> Result<u128, ChainError>
    {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        let key = (contract.clone(), wallet.clone());
        if self.failing.lock().unwrap().contains(&key) {
            return Err(ChainError::Rpc("scripted failure".into()));
        }
        Ok(self.balances.lock().unwrap().get(&key).copied().unwrap_or(0))
    }

    async fn latest_block(&self) -> Result<u64, ChainError> {
        Ok(self.latest.load(Ordering::SeqCst))
    }

    async fn block_timestamp(&self, block: u64) -> Result<Timestamp, ChainError> {
        self.block_times
            .lock()
            .unwrap()
            .get(&block)
            .map(|&secs| Timestamp::new(secs))
            .ok_or_else(|| ChainError::InvalidResponse(format!("no scripted block {block}")))
    }

    async fn transfer_events_to(
        &self,
        contract: &Address,
        wallet: &Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, ChainError> {
        self.log_queries.fetch_add(1, Ordering::SeqCst);
        let key = (contract.clone(), wallet.clone());
        Ok(self
            .transfers
            .lock()
            .unwrap()
            .get(&key)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|&&b| b >= from_block && b <= to_block)
                    .map(|&block_number| TransferEvent { block_number })
                    .collect()
            })
            .unwrap_or_default())
    }
}
