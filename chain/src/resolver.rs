//! Wallet eligibility resolution.
//!
//! Queries every configured collection's `balanceOf` for a wallet,
//! concurrently, and returns the highest weight among collections where the
//! wallet holds at least one token. Individual collection failures degrade
//! to balance 0 (fail-open); only a total outage fails the resolution.
//!
//! Weights are never cached: balances change, so callers re-resolve at
//! vote time.

use crate::reader::ChainReader;
use crate::ChainError;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use vouch_types::{Address, Collection, CollectionSet};

/// Tuning knobs for resolution.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Timeout for a single balance query attempt (each retry gets its own
    /// budget; this does not bound the whole resolution).
    pub call_timeout: Duration,
    /// Retries after the first failed attempt.
    pub retries: u32,
    /// Backoff before the first retry; doubles per subsequent retry.
    pub backoff_base: Duration,
    /// Cap on simultaneous in-flight RPC calls (client-side rate limiting).
    pub max_concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            retries: 2,
            backoff_base: Duration::from_millis(500),
            max_concurrency: 4,
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Highest weight among held collections; 0 if none held.
    pub weight: u32,
    /// True when at least one collection query failed after retries and was
    /// counted as balance 0. The result is still valid, just flagged.
    pub degraded: bool,
    /// Names of the collections whose queries failed.
    pub failed: Vec<String>,
}

impl Resolution {
    /// Whether the wallet currently qualifies to vote at all.
    pub fn is_eligible(&self) -> bool {
        self.weight > 0
    }
}

/// Resolves a wallet address to its current voting weight.
///
/// Holds no mutable state; safe to share across request handlers.
pub struct EligibilityResolver {
    reader: Arc<dyn ChainReader>,
    collections: CollectionSet,
    config: ResolverConfig,
    limiter: Arc<Semaphore>,
}

impl EligibilityResolver {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        collections: CollectionSet,
        config: ResolverConfig,
    ) -> Self {
        let limiter = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self {
            reader,
            collections,
            config,
            limiter,
        }
    }

    pub fn collections(&self) -> &CollectionSet {
        &self.collections
    }

    /// Resolve `wallet` to its current voting weight.
    ///
    /// For a fixed on-chain state this is a pure function of the wallet;
    /// across time it is not, since balances change.
    pub async fn resolve(&self, wallet: &Address) -> Result<Resolution, ChainError> {
        let queries = self.collections.iter().map(|collection| async move {
            let _permit = self.limiter.acquire().await.ok();
            let balance = self.balance_with_retry(collection, wallet).await;
            (collection, balance)
        });
        let results = join_all(queries).await;

        let mut weight = 0u32;
        let mut failed = Vec::new();
        for (collection, balance) in results {
            match balance {
                Ok(balance) if balance > 0 => weight = weight.max(collection.weight),
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        collection = %collection.name,
                        error = %e,
                        "collection balance query failed after retries; counting as zero"
                    );
                    failed.push(collection.name.clone());
                }
            }
        }

        if failed.len() == self.collections.len() {
            return Err(ChainError::Unavailable(format!(
                "all {} collection queries failed",
                failed.len()
            )));
        }

        debug!(wallet = %wallet, weight, degraded = !failed.is_empty(), "resolved voting weight");
        Ok(Resolution {
            weight,
            degraded: !failed.is_empty(),
            failed,
        })
    }

    /// One collection's balance query with per-attempt timeout and bounded
    /// exponential backoff.
    async fn balance_with_retry(
        &self,
        collection: &Collection,
        wallet: &Address,
    ) -> Result<u128, ChainError> {
        let mut backoff = self.config.backoff_base;
        let mut last_err = None;

        for attempt in 0..=self.config.retries {
            if attempt > 0 {
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            let call = self.reader.balance_of(&collection.address, wallet);
            match tokio::time::timeout(self.config.call_timeout, call).await {
                Ok(Ok(balance)) => return Ok(balance),
                Ok(Err(e)) => last_err = Some(e),
                Err(_) => {
                    last_err = Some(ChainError::Unreachable(format!(
                        "balance query timed out after {:?}",
                        self.config.call_timeout
                    )))
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ChainError::Rpc("no attempts made".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::null::NullChainReader;

    fn addr(seed: u8) -> Address {
        Address::parse(&format!("0x{:040x}", seed)).unwrap()
    }

    fn collections(weights: &[u32]) -> CollectionSet {
        let list = weights
            .iter()
            .enumerate()
            .map(|(i, &weight)| Collection {
                name: format!("collection-{i}"),
                weight,
                address: addr(100 + i as u8),
            })
            .collect();
        CollectionSet::new(list).unwrap()
    }

    fn resolver(reader: Arc<NullChainReader>, set: CollectionSet) -> EligibilityResolver {
        let config = ResolverConfig {
            backoff_base: Duration::from_millis(1),
            ..ResolverConfig::default()
        };
        EligibilityResolver::new(reader, set, config)
    }

    #[tokio::test]
    async fn takes_max_weight_not_first_match_or_sum() {
        let set = collections(&[2, 5, 7]);
        let reader = Arc::new(NullChainReader::new());
        let wallet = addr(1);
        for collection in set.iter() {
            reader.set_balance(&collection.address, &wallet, 1);
        }

        let resolution = resolver(reader, set).resolve(&wallet).await.unwrap();
        assert_eq!(resolution.weight, 7);
        assert!(!resolution.degraded);
    }

    #[tokio::test]
    async fn holds_nothing_resolves_zero() {
        let set = collections(&[2, 5, 7]);
        let reader = Arc::new(NullChainReader::new());
        let resolution = resolver(reader, set).resolve(&addr(1)).await.unwrap();
        assert_eq!(resolution.weight, 0);
        assert!(!resolution.is_eligible());
    }

    #[tokio::test]
    async fn single_failure_fails_open_with_degraded_flag() {
        let set = collections(&[2, 5, 7]);
        let reader = Arc::new(NullChainReader::new());
        let wallet = addr(1);
        let failing = set.iter().next().unwrap().address.clone();
        reader.fail_balance(&failing, &wallet);

        let resolution = resolver(reader, set).resolve(&wallet).await.unwrap();
        assert_eq!(resolution.weight, 0);
        assert!(resolution.degraded);
        assert_eq!(resolution.failed.len(), 1);
    }

    #[tokio::test]
    async fn total_outage_is_unavailable() {
        let set = collections(&[2, 5]);
        let reader = Arc::new(NullChainReader::new());
        let wallet = addr(1);
        for collection in set.iter() {
            reader.fail_balance(&collection.address, &wallet);
        }

        let err = resolver(reader, set).resolve(&wallet).await.unwrap_err();
        assert!(matches!(err, ChainError::Unavailable(_)));
    }

    #[tokio::test]
    async fn failed_query_is_retried() {
        let set = collections(&[3]);
        let reader = Arc::new(NullChainReader::new());
        let wallet = addr(1);
        let contract = set.iter().next().unwrap().address.clone();
        reader.fail_balance(&contract, &wallet);

        let _ = resolver(Arc::clone(&reader), set).resolve(&wallet).await;
        // 1 initial attempt + 2 retries.
        assert_eq!(reader.balance_calls(), 3);
    }
}
