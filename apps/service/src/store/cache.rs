use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::error;

use super::{IncidentRecord, IncidentStore};

/// In-memory front for the incident store. Constructed through
/// [`StoreCache::load`], which drains the backing scan before any cycle
/// can read or mutate state; an unloaded cache cannot exist.
///
/// Reads during a cycle hit only the map. Writes go to the map first and
/// then the backing store; a failed backing write is logged and swallowed
/// so the cache keeps reflecting the intended state.
pub struct StoreCache {
    backing: Arc<dyn IncidentStore>,
    records: HashMap<String, IncidentRecord>,
}

impl StoreCache {
    pub async fn load(backing: Arc<dyn IncidentStore>) -> Result<Self> {
        let records = backing
            .scan_all()
            .await?
            .into_iter()
            .map(|record| (record.url.clone(), record))
            .collect();

        Ok(Self { backing, records })
    }

    pub fn get(&self, url: &str) -> Option<&IncidentRecord> {
        self.records.get(url)
    }

    pub async fn put(&mut self, record: IncidentRecord) {
        self.records.insert(record.url.clone(), record.clone());

        if let Err(err) = self.backing.put(&record).await {
            error!("failed to persist incident record for {}: {err:#}", record.url);
        }
    }

    pub async fn delete(&mut self, url: &str) {
        self.records.remove(url);

        if let Err(err) = self.backing.delete(url).await {
            error!("failed to delete incident record for {url}: {err:#}");
        }
    }

    /// Current cached state, for the status dump.
    pub fn records(&self) -> impl Iterator<Item = &IncidentRecord> {
        self.records.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{FailingStore, MemoryStore};

    fn record(url: &str, first_error_at: i64, expiring: bool) -> IncidentRecord {
        IncidentRecord { url: url.to_string(), first_error_at, expiring }
    }

    #[tokio::test]
    async fn load_builds_cache_from_backing_scan() {
        let backing = Arc::new(MemoryStore::with_records(vec![
            record("http://a.example", 100, false),
            record("http://b.example", 0, true),
        ]));

        let cache = StoreCache::load(backing).await.unwrap();

        assert_eq!(cache.get("http://a.example"), Some(&record("http://a.example", 100, false)));
        assert_eq!(cache.get("http://b.example"), Some(&record("http://b.example", 0, true)));
        assert_eq!(cache.get("http://c.example"), None);
    }

    #[tokio::test]
    async fn writes_reach_cache_and_backing() {
        let backing = Arc::new(MemoryStore::default());
        let mut cache = StoreCache::load(backing.clone()).await.unwrap();

        cache.put(record("http://a.example", 42, false)).await;
        assert_eq!(cache.get("http://a.example"), Some(&record("http://a.example", 42, false)));
        assert_eq!(backing.record("http://a.example"), Some(record("http://a.example", 42, false)));

        cache.delete("http://a.example").await;
        assert_eq!(cache.get("http://a.example"), None);
        assert_eq!(backing.record("http://a.example"), None);
    }

    #[tokio::test]
    async fn idempotent_operations_leave_no_trace() {
        let backing = Arc::new(MemoryStore::default());
        let mut cache = StoreCache::load(backing.clone()).await.unwrap();

        // Deleting an absent record changes nothing
        cache.delete("http://missing.example").await;
        assert_eq!(backing.len(), 0);

        // Re-upserting an identical record is observationally identical
        cache.put(record("http://a.example", 7, true)).await;
        cache.put(record("http://a.example", 7, true)).await;
        assert_eq!(backing.len(), 1);
        assert_eq!(cache.get("http://a.example"), Some(&record("http://a.example", 7, true)));
    }

    #[tokio::test]
    async fn backing_failure_keeps_cache_state() {
        let mut cache = StoreCache::load(Arc::new(FailingStore)).await.unwrap();

        cache.put(record("http://a.example", 9, false)).await;
        assert_eq!(cache.get("http://a.example"), Some(&record("http://a.example", 9, false)));

        cache.delete("http://a.example").await;
        assert_eq!(cache.get("http://a.example"), None);
    }
}
