//! Incident persistence. One record per monitored url; the record exists
//! only while the url is in an error state or carries an expiring flag.
//!
//! Note: keying on the url alone means two rules that differ only by
//! operator would collide on the same record. Known limitation, kept as-is.

pub mod cache;
pub mod libsql;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sentinel for "no active error".
pub const NO_ERROR: i64 = 0;

/// Persisted error state of one url between cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub url: String,
    /// Epoch milliseconds of the first failed cycle, or [`NO_ERROR`]
    pub first_error_at: i64,
    /// Certificate-expiry flag, carried independently of the error timer
    pub expiring: bool,
}

impl IncidentRecord {
    pub fn has_active_error(&self) -> bool {
        self.first_error_at != NO_ERROR
    }

    /// An empty record carries no state worth persisting.
    pub fn is_empty(&self) -> bool {
        self.first_error_at == NO_ERROR && !self.expiring
    }
}

/// Backing key-value store for incident records.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    async fn get(&self, url: &str) -> Result<Option<IncidentRecord>>;

    async fn put(&self, record: &IncidentRecord) -> Result<()>;

    async fn delete(&self, url: &str) -> Result<()>;

    /// Full scan used once at startup to build the in-memory cache.
    /// Implementations must drive the scan to completion.
    async fn scan_all(&self) -> Result<Vec<IncidentRecord>>;
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory store for tests.
    #[derive(Default)]
    pub struct MemoryStore {
        records: Mutex<HashMap<String, IncidentRecord>>,
    }

    impl MemoryStore {
        pub fn with_records(records: Vec<IncidentRecord>) -> Self {
            let map = records.into_iter().map(|r| (r.url.clone(), r)).collect();
            Self { records: Mutex::new(map) }
        }

        pub fn record(&self, url: &str) -> Option<IncidentRecord> {
            self.records.lock().unwrap().get(url).cloned()
        }

        pub fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl IncidentStore for MemoryStore {
        async fn get(&self, url: &str) -> Result<Option<IncidentRecord>> {
            Ok(self.records.lock().unwrap().get(url).cloned())
        }

        async fn put(&self, record: &IncidentRecord) -> Result<()> {
            self.records.lock().unwrap().insert(record.url.clone(), record.clone());
            Ok(())
        }

        async fn delete(&self, url: &str) -> Result<()> {
            self.records.lock().unwrap().remove(url);
            Ok(())
        }

        async fn scan_all(&self) -> Result<Vec<IncidentRecord>> {
            Ok(self.records.lock().unwrap().values().cloned().collect())
        }
    }

    /// Store whose writes always fail, for availability-over-consistency
    /// coverage.
    #[derive(Default)]
    pub struct FailingStore;

    #[async_trait]
    impl IncidentStore for FailingStore {
        async fn get(&self, _url: &str) -> Result<Option<IncidentRecord>> {
            Ok(None)
        }

        async fn put(&self, _record: &IncidentRecord) -> Result<()> {
            anyhow::bail!("backing store unavailable")
        }

        async fn delete(&self, _url: &str) -> Result<()> {
            anyhow::bail!("backing store unavailable")
        }

        async fn scan_all(&self) -> Result<Vec<IncidentRecord>> {
            Ok(Vec::new())
        }
    }
}
