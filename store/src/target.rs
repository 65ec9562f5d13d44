//! Target record and storage trait.
//!
//! A target is the account being voted on. The store exclusively owns
//! persisted target state; the engine reads a record, mutates a copy, and
//! writes it back with [`TargetStore::update_target_conditional`] so that
//! concurrent mutations on the same target are serialized by version-CAS
//! rather than a lock.

use crate::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vouch_types::{Address, Score, Status, Vote};

/// Lifecycle state of a target.
///
/// `Pending → Active` once profile enrichment completes (written by the
/// enrichment collaborator); `Active → Claimed` once the account-claiming
/// flow verifies ownership. Votes are accepted in `Active` and `Claimed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetState {
    Pending,
    Active,
    Claimed,
}

/// Persisted state for one target, including its embedded vote ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    /// Unique key.
    pub username: String,
    pub display_name: String,
    pub follower_count: u64,
    /// Avatar URL populated by enrichment; `None` while pending.
    pub avatar_url: Option<String>,
    /// Wallet verified as owning this account, set by the claiming flow.
    pub claimed_wallet: Option<Address>,
    /// Backed by the project team (display badge, not weight-relevant).
    pub is_official: bool,
    /// Held the designated collection before the cutoff (advisory badge).
    pub is_early_holder: bool,
    pub state: TargetState,
    /// At most one vote per voter.
    pub votes: Vec<Vote>,
    /// Cached aggregate, always recomputed from `votes` on mutation.
    pub score: Score,
    /// Monotonic version for conditional writes. Incremented by the store
    /// on every successful update.
    pub version: u64,
}

impl TargetRecord {
    /// A freshly submitted target: pending enrichment, empty ledger.
    pub fn pending(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            display_name: username.clone(),
            username,
            follower_count: 0,
            avatar_url: None,
            claimed_wallet: None,
            is_official: false,
            is_early_holder: false,
            state: TargetState::Pending,
            votes: Vec::new(),
            score: Score::ZERO,
            version: 0,
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.state == TargetState::Claimed
    }

    /// Whether this target currently accepts votes.
    pub fn accepts_votes(&self) -> bool {
        matches!(self.state, TargetState::Active | TargetState::Claimed)
    }

    /// Current status tier, derived from the cached score.
    pub fn status(&self) -> Status {
        self.score.classify()
    }
}

/// Filters for the listing surface (consumed by the presentation layer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetFilter {
    #[default]
    All,
    Status(Status),
    Official,
    EarlyHolder,
}

/// Sort orders for the listing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetSort {
    #[default]
    ApprovalRateDesc,
    ApprovalRateAsc,
    Followers,
    NameAsc,
    NameDesc,
}

/// Pagination window.
#[derive(Clone, Copy, Debug)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self { offset: 0, limit: 10 }
    }
}

/// Trait for target storage operations.
#[async_trait]
pub trait TargetStore: Send + Sync {
    async fn get_target(&self, username: &str) -> Result<TargetRecord, StoreError>;

    /// Create a new target. Fails with [`StoreError::Duplicate`] if the
    /// username is already taken.
    async fn create_target(&self, record: &TargetRecord) -> Result<(), StoreError>;

    /// Conditionally replace a target record.
    ///
    /// Succeeds (returning `true`) only if the stored version still equals
    /// `expected_version`; the stored record's version is then bumped past
    /// it. Returns `false` when the version check loses the race, in which
    /// case the caller reloads and retries.
    async fn update_target_conditional(
        &self,
        username: &str,
        expected_version: u64,
        record: &TargetRecord,
    ) -> Result<bool, StoreError>;

    /// List targets for presentation. Filtering and sorting happen before
    /// pagination.
    async fn list_targets(
        &self,
        filter: TargetFilter,
        sort: TargetSort,
        page: Page,
    ) -> Result<Vec<TargetRecord>, StoreError>;

    async fn target_count(&self) -> Result<u64, StoreError>;
}
