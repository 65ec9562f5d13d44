//! The voting engine orchestrator.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use vouch_chain::{EligibilityResolver, Resolution};
use vouch_store::{StoreError, TargetRecord, TargetStore};
use vouch_types::{Address, Score, Timestamp, Vote, VoteDirection};

use crate::error::EngineError;
use crate::ledger;

/// How many times a lost conditional write is retried before surfacing
/// [`EngineError::Conflict`].
pub const MAX_CAS_ATTEMPTS: u32 = 3;

/// Twitter handle rule: 1–15 characters of `[A-Za-z0-9_]`.
const MAX_USERNAME_LEN: usize = 15;

/// Outcome of submitting a target for listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// A pending target was created; enrichment was signalled.
    Accepted,
    /// A target with that username already exists. A normal outcome, not
    /// an error; nothing was mutated.
    AlreadyExists,
}

/// Outcome of a caller-driven eligibility re-check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecheckOutcome {
    /// The wallet still holds qualifying tokens; its vote stands.
    StillEligible { weight: u32 },
    /// Weight dropped to zero; the voter's slot was removed.
    Revoked { score: Score },
}

/// Request for asynchronous profile enrichment of a freshly submitted
/// target. Consumed by the enrichment collaborator, not by the engine.
#[derive(Clone, Debug)]
pub struct EnrichmentRequest {
    pub username: String,
    pub requested_at: Timestamp,
}

/// Orchestrates vote casting, revocation, and target submission.
///
/// Holds no long-lived state beyond its injected collaborators, so a single
/// instance is safely shared across concurrent request handlers, and
/// multiple replicas can run against the same store.
pub struct VotingEngine {
    store: Arc<dyn TargetStore>,
    resolver: EligibilityResolver,
    enrichment_tx: Option<mpsc::Sender<EnrichmentRequest>>,
}

impl VotingEngine {
    pub fn new(store: Arc<dyn TargetStore>, resolver: EligibilityResolver) -> Self {
        Self {
            store,
            resolver,
            enrichment_tx: None,
        }
    }

    /// Attach the queue on which submissions signal that profile enrichment
    /// is required.
    pub fn with_enrichment_queue(mut self, tx: mpsc::Sender<EnrichmentRequest>) -> Self {
        self.enrichment_tx = Some(tx);
        self
    }

    /// Cast (or replace) `voter`'s weighted vote on `username`.
    ///
    /// Validation short-circuits in order: target exists → target accepts
    /// votes → voter address parses → weight resolves non-zero. None of the
    /// rejection paths mutate the ledger. Re-casting an identical vote is a
    /// no-op that returns the current score.
    pub async fn cast_vote(
        &self,
        username: &str,
        voter: &str,
        direction: VoteDirection,
    ) -> Result<Score, EngineError> {
        let mut record = self.load_target(username).await?;
        if !record.accepts_votes() {
            return Err(EngineError::TargetNotReady(username.to_string()));
        }
        let voter = Address::parse(voter)?;

        // Always re-resolved at vote time; weights are never cached.
        let resolution = self.resolver.resolve(&voter).await?;
        if !resolution.is_eligible() {
            return Err(EngineError::NotEligible);
        }
        let weight = resolution.weight;

        for attempt in 0..MAX_CAS_ATTEMPTS {
            if attempt > 0 {
                record = self.load_target(username).await?;
                if !record.accepts_votes() {
                    return Err(EngineError::TargetNotReady(username.to_string()));
                }
            }

            // Idempotent replay: same direction, same weight — no mutation.
            if let Some(existing) = record.votes.iter().find(|v| v.voter == voter) {
                if existing.direction == direction && existing.weight == weight {
                    debug!(username, voter = %voter, "identical re-vote, no-op");
                    return Ok(record.score);
                }
            }

            let mut updated = record.clone();
            ledger::apply_vote(
                &mut updated,
                Vote::new(voter.clone(), weight, direction, Timestamp::now()),
            );

            if self
                .store
                .update_target_conditional(username, record.version, &updated)
                .await?
            {
                info!(
                    username,
                    voter = %voter,
                    weight,
                    ?direction,
                    up = updated.score.up,
                    down = updated.score.down,
                    "vote applied"
                );
                return Ok(updated.score);
            }
            debug!(username, attempt, "lost conditional write race, reloading");
        }

        Err(EngineError::Conflict(username.to_string()))
    }

    /// Remove `voter`'s vote from `username` entirely and recompute.
    ///
    /// Used when a wallet's weight drops to 0 on re-check, so stale
    /// influence cannot outlive the qualifying tokens. Removing an absent
    /// vote succeeds and returns the unchanged score.
    pub async fn revoke_votes(&self, username: &str, voter: &str) -> Result<Score, EngineError> {
        let voter = Address::parse(voter)?;
        self.revoke_resolved(username, &voter).await
    }

    async fn revoke_resolved(
        &self,
        username: &str,
        voter: &Address,
    ) -> Result<Score, EngineError> {
        for _attempt in 0..MAX_CAS_ATTEMPTS {
            let record = self.load_target(username).await?;
            let mut updated = record.clone();
            if !ledger::remove_vote(&mut updated, voter) {
                return Ok(record.score);
            }

            if self
                .store
                .update_target_conditional(username, record.version, &updated)
                .await?
            {
                info!(
                    username,
                    voter = %voter,
                    up = updated.score.up,
                    down = updated.score.down,
                    "vote revoked"
                );
                return Ok(updated.score);
            }
        }

        Err(EngineError::Conflict(username.to_string()))
    }

    /// Submit a username for listing.
    ///
    /// Creates a `Pending` stub and signals asynchronous enrichment; the
    /// two-phase "create stub, enrich later" lifecycle means the target
    /// rejects votes until the enrichment collaborator activates it.
    pub async fn submit(&self, username: &str) -> Result<SubmissionOutcome, EngineError> {
        validate_username(username)?;

        match self.store.get_target(username).await {
            Ok(_) => return Ok(SubmissionOutcome::AlreadyExists),
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        match self.store.create_target(&TargetRecord::pending(username)).await {
            Ok(()) => {}
            // Lost a create race: same soft outcome as finding it above.
            Err(StoreError::Duplicate(_)) => return Ok(SubmissionOutcome::AlreadyExists),
            Err(e) => return Err(e.into()),
        }

        if let Some(tx) = &self.enrichment_tx {
            let request = EnrichmentRequest {
                username: username.to_string(),
                requested_at: Timestamp::now(),
            };
            if tx.try_send(request).is_err() {
                warn!(username, "enrichment queue full, enrichment delayed");
            }
        }

        info!(username, "target submitted, pending enrichment");
        Ok(SubmissionOutcome::Accepted)
    }

    /// Caller-driven eligibility re-check for one (target, voter) pair.
    ///
    /// Re-resolves the wallet and revokes its vote when the weight is now 0.
    /// A resolution failure propagates instead of revoking: an RPC outage
    /// must never strip a legitimate holder's vote.
    pub async fn recheck_voter(
        &self,
        username: &str,
        voter: &str,
    ) -> Result<RecheckOutcome, EngineError> {
        let voter = Address::parse(voter)?;
        let resolution = self.resolver.resolve(&voter).await?;

        if resolution.is_eligible() {
            return Ok(RecheckOutcome::StillEligible {
                weight: resolution.weight,
            });
        }

        let score = self.revoke_resolved(username, &voter).await?;
        Ok(RecheckOutcome::Revoked { score })
    }

    /// Resolve a wallet's current voting weight without touching any ledger.
    pub async fn resolve_weight(&self, wallet: &str) -> Result<Resolution, EngineError> {
        let wallet = Address::parse(wallet)?;
        Ok(self.resolver.resolve(&wallet).await?)
    }

    async fn load_target(&self, username: &str) -> Result<TargetRecord, EngineError> {
        match self.store.get_target(username).await {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound(_)) => {
                Err(EngineError::TargetNotFound(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Validate a submitted handle: 1–15 chars of `[A-Za-z0-9_]`.
fn validate_username(username: &str) -> Result<(), EngineError> {
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(EngineError::InvalidUsername(username.to_string()));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(EngineError::InvalidUsername(username.to_string()));
    }
    Ok(())
}
