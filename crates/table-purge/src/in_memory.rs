//! In-Memory Record Table Implementation
//!
//! Keeps record keys in an ordered map behind `Arc<RwLock<>>`. Scans are paged
//! the same way a remote table pages them, and individual deletes can be made to
//! fail. Suitable for:
//! - Unit and scenario testing of the purge flow
//! - Local experiments without AWS credentials

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::DEFAULT_KEY_ATTRIBUTE;
use crate::error::{PurgeError, PurgeResult};
use crate::traits::{KeyPage, PageCursor, RecordKey, RecordTable};

/// Configuration for an in-memory table
#[derive(Debug, Clone)]
pub struct InMemoryConfig {
    /// Name reported by `table_name()`
    pub table_name: String,
    /// Attribute name used inside page cursors
    pub key_attribute: String,
    /// Keys returned per scan page
    pub page_size: usize,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            table_name: "in-memory".to_string(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
            page_size: 100,
        }
    }
}

/// In-memory table of record keys
#[derive(Debug, Clone)]
pub struct InMemoryTable {
    /// Live records, ordered by key so scans are deterministic
    records: Arc<RwLock<BTreeSet<RecordKey>>>,
    /// Keys whose delete call returns an error
    failing_keys: Arc<RwLock<HashSet<RecordKey>>>,
    /// Every delete call in the order it was made
    delete_calls: Arc<RwLock<Vec<RecordKey>>>,
    count_calls: Arc<AtomicUsize>,
    scan_calls: Arc<AtomicUsize>,
    /// When set, count-only queries return an error
    failing_counts: Arc<AtomicBool>,
    /// When set, key scans return an error
    failing_scans: Arc<AtomicBool>,
    config: InMemoryConfig,
}

impl Default for InMemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTable {
    /// Create an empty table with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryConfig::default())
    }

    /// Create an empty table with custom configuration
    pub fn with_config(config: InMemoryConfig) -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeSet::new())),
            failing_keys: Arc::new(RwLock::new(HashSet::new())),
            delete_calls: Arc::new(RwLock::new(Vec::new())),
            count_calls: Arc::new(AtomicUsize::new(0)),
            scan_calls: Arc::new(AtomicUsize::new(0)),
            failing_counts: Arc::new(AtomicBool::new(false)),
            failing_scans: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    /// Create a table pre-populated with keys, paged `page_size` at a time
    pub async fn with_keys<I, K>(keys: I, page_size: usize) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<RecordKey>,
    {
        let table = Self::with_config(InMemoryConfig {
            page_size,
            ..InMemoryConfig::default()
        });
        table.insert_records(keys).await;
        table
    }

    /// Add records; existing keys are left as they are
    pub async fn insert_records<I, K>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<RecordKey>,
    {
        let mut records = self.records.write().await;
        records.extend(keys.into_iter().map(Into::into));
    }

    /// Make every delete of `key` fail until cleared
    pub async fn fail_deletes_for(&self, key: impl Into<RecordKey>) {
        self.failing_keys.write().await.insert(key.into());
    }

    /// Make every count-only query fail, as an unreachable service would
    pub fn fail_counts(&self) {
        self.failing_counts.store(true, Ordering::SeqCst);
    }

    /// Make every key scan fail
    pub fn fail_scans(&self) {
        self.failing_scans.store(true, Ordering::SeqCst);
    }

    /// Keys passed to `delete_record`, in call order, including failed calls
    pub async fn delete_calls(&self) -> Vec<RecordKey> {
        self.delete_calls.read().await.clone()
    }

    /// Snapshot of the keys still present
    pub async fn remaining_keys(&self) -> Vec<RecordKey> {
        self.records.read().await.iter().cloned().collect()
    }

    /// Number of count-only queries served
    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    /// Number of key scan pages served
    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordTable for InMemoryTable {
    fn backend_name(&self) -> &'static str {
        "InMemory"
    }

    fn table_name(&self) -> &str {
        &self.config.table_name
    }

    async fn count_records(&self) -> PurgeResult<usize> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_counts.load(Ordering::SeqCst) {
            return Err(PurgeError::AwsError(format!(
                "injected count failure for '{}'",
                self.config.table_name
            )));
        }
        Ok(self.records.read().await.len())
    }

    async fn scan_keys(&self, cursor: Option<PageCursor>) -> PurgeResult<KeyPage> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_scans.load(Ordering::SeqCst) {
            return Err(PurgeError::AwsError(format!(
                "injected scan failure for '{}'",
                self.config.table_name
            )));
        }

        let start_after = match &cursor {
            Some(cursor) => Some(
                cursor
                    .get(&self.config.key_attribute)
                    .map(RecordKey::from)
                    .ok_or_else(|| {
                        PurgeError::MalformedItem(format!(
                            "cursor does not carry attribute '{}'",
                            self.config.key_attribute
                        ))
                    })?,
            ),
            None => None,
        };

        let records = self.records.read().await;
        let mut remaining = records
            .iter()
            .filter(|key| start_after.as_ref().is_none_or(|after| *key > after));

        let page_size = self.config.page_size.max(1);
        let keys: Vec<RecordKey> = remaining.by_ref().take(page_size).cloned().collect();
        let next_cursor = match (keys.last(), remaining.next()) {
            (Some(last), Some(_)) => Some(PageCursor::single(
                self.config.key_attribute.clone(),
                last.as_str(),
            )),
            _ => None,
        };

        debug!(
            "In-memory scan returned {} keys (more: {})",
            keys.len(),
            next_cursor.is_some()
        );
        Ok(KeyPage { keys, next_cursor })
    }

    async fn delete_record(&self, key: &RecordKey) -> PurgeResult<()> {
        self.delete_calls.write().await.push(key.clone());

        if self.failing_keys.read().await.contains(key) {
            return Err(PurgeError::AwsError(format!(
                "injected delete failure for '{}'",
                key
            )));
        }

        // Deleting an absent key succeeds, matching DeleteItem without a condition
        self.records.write().await.remove(key);
        Ok(())
    }
}
