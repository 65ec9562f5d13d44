//! Service wiring: builds the engine from configuration and runs the
//! background enrichment worker until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use vouch_chain::{EligibilityResolver, JsonRpcChainReader};
use vouch_engine::{EnrichmentRequest, VotingEngine};
use vouch_store::TargetStore;
use vouch_store_memory::MemoryStore;

use crate::config::VouchConfig;
use crate::shutdown::ShutdownController;

/// The assembled vouch service.
///
/// Owns the engine and the enrichment worker. The request surface (HTTP or
/// otherwise) mounts on top of [`engine`](Self::engine); it is deliberately
/// not part of this binary.
pub struct VouchService {
    engine: Arc<VotingEngine>,
    shutdown: ShutdownController,
    enrichment_rx: Option<mpsc::Receiver<EnrichmentRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl VouchService {
    /// Build the service from configuration: JSON-RPC chain reader,
    /// eligibility resolver, in-memory store, engine, enrichment queue.
    pub fn new(config: &VouchConfig) -> anyhow::Result<Self> {
        let collections = config.collection_set()?;
        let reader = Arc::new(JsonRpcChainReader::with_timeout(
            &config.rpc_endpoint,
            Duration::from_secs(config.resolver_timeout_secs),
        ));
        let resolver =
            EligibilityResolver::new(reader, collections, config.resolver_config());
        let store: Arc<dyn TargetStore> = Arc::new(MemoryStore::new());

        let (tx, rx) = mpsc::channel(config.enrichment_queue_depth.max(1));
        let engine = Arc::new(VotingEngine::new(store, resolver).with_enrichment_queue(tx));

        Ok(Self {
            engine,
            shutdown: ShutdownController::new(),
            enrichment_rx: Some(rx),
            worker: None,
        })
    }

    pub fn engine(&self) -> Arc<VotingEngine> {
        Arc::clone(&self.engine)
    }

    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// Spawn the enrichment worker.
    ///
    /// Profile enrichment itself (follower counts, display names, avatars)
    /// is an external collaborator; this worker drains the queue and records
    /// what is owed so the collaborator can pick it up.
    pub fn start(&mut self) {
        let Some(mut rx) = self.enrichment_rx.take() else {
            return;
        };
        let mut shutdown_rx = self.shutdown.subscribe();

        self.worker = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    request = rx.recv() => {
                        match request {
                            Some(EnrichmentRequest { username, requested_at }) => {
                                info!(
                                    username = %username,
                                    %requested_at,
                                    "target awaiting profile enrichment"
                                );
                            }
                            None => break,
                        }
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        }));
    }

    /// Stop the worker and wait for it to drain.
    pub async fn stop(&mut self) {
        self.shutdown.shutdown();
        if let Some(worker) = self.worker.take() {
            if worker.await.is_err() {
                warn!("enrichment worker terminated abnormally");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_engine::SubmissionOutcome;

    #[tokio::test]
    async fn service_starts_and_stops_cleanly() {
        let mut service = VouchService::new(&VouchConfig::default()).unwrap();
        service.start();
        service.stop().await;
    }

    #[tokio::test]
    async fn submissions_flow_through_to_the_worker() {
        let mut service = VouchService::new(&VouchConfig::default()).unwrap();
        service.start();

        let outcome = service.engine().submit("claira").await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::Accepted);

        service.stop().await;
    }
}
