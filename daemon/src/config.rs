//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use vouch_chain::ResolverConfig;
use vouch_types::{Address, Collection, CollectionSet, CollectionSetError, Timestamp};

/// Configuration for the vouch daemon.
///
/// Can be loaded from a TOML file via [`VouchConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default so a
/// bare `[collections]`-less file still runs against the mainnet table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VouchConfig {
    /// Ethereum JSON-RPC endpoint for balance and event queries.
    #[serde(default = "default_rpc_endpoint")]
    pub rpc_endpoint: String,

    /// Ranked collection table. Defaults to the production set.
    #[serde(default = "default_collections")]
    pub collections: Vec<Collection>,

    /// Collection whose pre-cutoff holders get the early-holder badge.
    #[serde(default = "default_og_collection")]
    pub og_collection: Address,

    /// Early-holder cutoff instant (Unix seconds).
    #[serde(default = "default_og_cutoff_secs")]
    pub og_cutoff_secs: u64,

    /// Per-attempt timeout for a single balance query, in seconds.
    #[serde(default = "default_resolver_timeout_secs")]
    pub resolver_timeout_secs: u64,

    /// Retries after the first failed balance query attempt.
    #[serde(default = "default_resolver_retries")]
    pub resolver_retries: u32,

    /// Backoff before the first retry, in milliseconds (doubles per retry).
    #[serde(default = "default_resolver_backoff_ms")]
    pub resolver_backoff_ms: u64,

    /// Cap on simultaneous in-flight RPC calls.
    #[serde(default = "default_resolver_max_concurrency")]
    pub resolver_max_concurrency: usize,

    /// Capacity of the enrichment request queue.
    #[serde(default = "default_enrichment_queue_depth")]
    pub enrichment_queue_depth: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl VouchConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validate the configured collection table.
    pub fn collection_set(&self) -> Result<CollectionSet, CollectionSetError> {
        CollectionSet::new(self.collections.clone())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            call_timeout: Duration::from_secs(self.resolver_timeout_secs),
            retries: self.resolver_retries,
            backoff_base: Duration::from_millis(self.resolver_backoff_ms),
            max_concurrency: self.resolver_max_concurrency,
        }
    }

    pub fn og_cutoff(&self) -> Timestamp {
        Timestamp::new(self.og_cutoff_secs)
    }
}

impl Default for VouchConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: default_rpc_endpoint(),
            collections: default_collections(),
            og_collection: default_og_collection(),
            og_cutoff_secs: default_og_cutoff_secs(),
            resolver_timeout_secs: default_resolver_timeout_secs(),
            resolver_retries: default_resolver_retries(),
            resolver_backoff_ms: default_resolver_backoff_ms(),
            resolver_max_concurrency: default_resolver_max_concurrency(),
            enrichment_queue_depth: default_enrichment_queue_depth(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_rpc_endpoint() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_collections() -> Vec<Collection> {
    CollectionSet::mainnet_defaults().iter().cloned().collect()
}

fn default_og_collection() -> Address {
    // Milady Maker.
    Address::parse("0x5af0d9827e0c53e4799bb226655a1de152a425a5")
        .expect("static address is valid")
}

fn default_og_cutoff_secs() -> u64 {
    // 2022-05-23T05:04:00Z.
    1_653_282_240
}

fn default_resolver_timeout_secs() -> u64 {
    5
}

fn default_resolver_retries() -> u32 {
    2
}

fn default_resolver_backoff_ms() -> u64 {
    500
}

fn default_resolver_max_concurrency() -> usize {
    4
}

fn default_enrichment_queue_depth() -> usize {
    64
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = VouchConfig::default();
        let set = config.collection_set().unwrap();
        assert_eq!(set.len(), 10);
        assert_eq!(config.resolver_config().retries, 2);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: VouchConfig = toml::from_str(
            r#"
            rpc_endpoint = "https://mainnet.example/v3/key"
            resolver_retries = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.rpc_endpoint, "https://mainnet.example/v3/key");
        assert_eq!(config.resolver_retries, 5);
        assert_eq!(config.resolver_timeout_secs, 5);
        assert_eq!(config.collections.len(), 10);
    }

    #[test]
    fn custom_collection_table_parses() {
        let config: VouchConfig = toml::from_str(
            r#"
            [[collections]]
            name = "Test Collection"
            weight = 3
            address = "0x09f66a094a0070ebddefa192a33fa5d75b59d46b"
            "#,
        )
        .unwrap();
        let set = config.collection_set().unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.max_weight(), 3);
    }

    #[test]
    fn bad_collection_address_is_rejected() {
        let result: Result<VouchConfig, _> = toml::from_str(
            r#"
            [[collections]]
            name = "Broken"
            weight = 3
            address = "not-an-address"
            "#,
        );
        assert!(result.is_err());
    }
}
