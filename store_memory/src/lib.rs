//! In-memory `TargetStore` backend.
//!
//! Thread-safe for use with tokio's multi-threaded runtime. This is both
//! the deterministic store used by tests and the injected backend for
//! development deployments; a document-database adapter implements the same
//! trait for production.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use vouch_store::{Page, StoreError, TargetFilter, TargetRecord, TargetSort, TargetStore};

/// A `HashMap`-backed target store with version-CAS conditional updates.
pub struct MemoryStore {
    targets: Mutex<HashMap<String, TargetRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            targets: Mutex::new(HashMap::new()),
        }
    }

    /// Insert a record directly, bypassing version checks. Test setup only.
    pub fn seed(&self, record: TargetRecord) {
        self.targets
            .lock()
            .unwrap()
            .insert(record.username.clone(), record);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TargetStore for MemoryStore {
    async fn get_target(&self, username: &str) -> Result<TargetRecord, StoreError> {
        self.targets
            .lock()
            .unwrap()
            .get(username)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(username.to_string()))
    }

    async fn create_target(&self, record: &TargetRecord) -> Result<(), StoreError> {
        let mut targets = self.targets.lock().unwrap();
        if targets.contains_key(&record.username) {
            return Err(StoreError::Duplicate(record.username.clone()));
        }
        targets.insert(record.username.clone(), record.clone());
        Ok(())
    }

    async fn update_target_conditional(
        &self,
        username: &str,
        expected_version: u64,
        record: &TargetRecord,
    ) -> Result<bool, StoreError> {
        let mut targets = self.targets.lock().unwrap();
        let current = targets
            .get(username)
            .ok_or_else(|| StoreError::NotFound(username.to_string()))?;
        if current.version != expected_version {
            return Ok(false);
        }
        let mut updated = record.clone();
        updated.version = expected_version + 1;
        targets.insert(username.to_string(), updated);
        Ok(true)
    }

    async fn list_targets(
        &self,
        filter: TargetFilter,
        sort: TargetSort,
        page: Page,
    ) -> Result<Vec<TargetRecord>, StoreError> {
        let targets = self.targets.lock().unwrap();
        let mut records: Vec<TargetRecord> = targets
            .values()
            .filter(|t| match filter {
                TargetFilter::All => true,
                TargetFilter::Status(status) => t.status() == status,
                TargetFilter::Official => t.is_official,
                TargetFilter::EarlyHolder => t.is_early_holder,
            })
            .cloned()
            .collect();

        match sort {
            TargetSort::ApprovalRateDesc => {
                records.sort_by(|a, b| b.score.approval_rate().cmp(&a.score.approval_rate()))
            }
            TargetSort::ApprovalRateAsc => {
                records.sort_by(|a, b| a.score.approval_rate().cmp(&b.score.approval_rate()))
            }
            TargetSort::Followers => {
                records.sort_by(|a, b| b.follower_count.cmp(&a.follower_count))
            }
            TargetSort::NameAsc => records.sort_by(|a, b| a.display_name.cmp(&b.display_name)),
            TargetSort::NameDesc => records.sort_by(|a, b| b.display_name.cmp(&a.display_name)),
        }

        Ok(records
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect())
    }

    async fn target_count(&self) -> Result<u64, StoreError> {
        Ok(self.targets.lock().unwrap().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_store::TargetState;
    use vouch_types::Score;

    fn active(username: &str, up: u64, down: u64, followers: u64) -> TargetRecord {
        let mut record = TargetRecord::pending(username);
        record.state = TargetState::Active;
        record.score = Score { up, down };
        record.follower_count = followers;
        record
    }

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let store = MemoryStore::new();
        store.create_target(&TargetRecord::pending("alice")).await.unwrap();
        let record = store.get_target("alice").await.unwrap();
        assert_eq!(record.username, "alice");
        assert_eq!(record.version, 0);
    }

    #[tokio::test]
    async fn create_duplicate_rejected() {
        let store = MemoryStore::new();
        store.create_target(&TargetRecord::pending("alice")).await.unwrap();
        let err = store.create_target(&TargetRecord::pending("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get_target("ghost").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn conditional_update_bumps_version() {
        let store = MemoryStore::new();
        store.create_target(&TargetRecord::pending("alice")).await.unwrap();

        let mut record = store.get_target("alice").await.unwrap();
        record.follower_count = 42;
        let ok = store.update_target_conditional("alice", 0, &record).await.unwrap();
        assert!(ok);

        let reloaded = store.get_target("alice").await.unwrap();
        assert_eq!(reloaded.follower_count, 42);
        assert_eq!(reloaded.version, 1);
    }

    #[tokio::test]
    async fn conditional_update_refuses_stale_version() {
        let store = MemoryStore::new();
        store.create_target(&TargetRecord::pending("alice")).await.unwrap();

        let record = store.get_target("alice").await.unwrap();
        assert!(store.update_target_conditional("alice", 0, &record).await.unwrap());

        // Second writer still holds version 0: must lose.
        let ok = store.update_target_conditional("alice", 0, &record).await.unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn list_filters_and_sorts() {
        let store = MemoryStore::new();
        store.seed(active("high", 90, 10, 5));
        store.seed(active("low", 10, 90, 500));
        store.seed(active("mid", 50, 50, 50));

        let by_rate = store
            .list_targets(TargetFilter::All, TargetSort::ApprovalRateDesc, Page::default())
            .await
            .unwrap();
        let names: Vec<&str> = by_rate.iter().map(|t| t.username.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);

        let by_followers = store
            .list_targets(TargetFilter::All, TargetSort::Followers, Page::default())
            .await
            .unwrap();
        assert_eq!(by_followers[0].username, "low");

        let approved = store
            .list_targets(
                TargetFilter::Status(vouch_types::Status::Approved),
                TargetSort::ApprovalRateDesc,
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].username, "high");
    }

    #[tokio::test]
    async fn list_paginates() {
        let store = MemoryStore::new();
        for i in 0..25 {
            store.seed(active(&format!("user{i:02}"), 1, 0, i));
        }
        let page = store
            .list_targets(
                TargetFilter::All,
                TargetSort::NameAsc,
                Page { offset: 20, limit: 10 },
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].username, "user20");
    }
}
