//! Record Table Trait and Key Types
//!
//! The purge only ever needs three remote operations: a count-only scan, a
//! key-projected paged scan and a delete by primary key. `RecordTable` captures
//! exactly those so the run logic works the same against DynamoDB or the
//! in-memory backend used in tests.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::PurgeResult;

/// Opaque primary key value addressing one record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Continuation marker returned by a paged scan.
///
/// Holds the last evaluated key as attribute name -> string value. Callers
/// never inspect it; they only hand it back to the next `scan_keys` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(BTreeMap<String, String>);

impl PageCursor {
    pub fn new(attributes: BTreeMap<String, String>) -> Self {
        Self(attributes)
    }

    /// Cursor for a table keyed by a single attribute
    pub fn single(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self(BTreeMap::from([(attribute.into(), value.into())]))
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.0.get(attribute).map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One page of a key-projected scan
#[derive(Debug, Clone, Default)]
pub struct KeyPage {
    /// Keys in the order the backend returned them
    pub keys: Vec<RecordKey>,
    /// Present while more results remain
    pub next_cursor: Option<PageCursor>,
}

impl KeyPage {
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Core trait for tables a purge can run against
#[async_trait]
pub trait RecordTable: Send + Sync {
    /// Get the backend name for logging and debugging
    fn backend_name(&self) -> &'static str;

    /// Name of the table this handle points at
    fn table_name(&self) -> &str;

    /// Total number of records currently in the table
    async fn count_records(&self) -> PurgeResult<usize>;

    /// Fetch one page of primary keys, resuming after `cursor` when given
    async fn scan_keys(&self, cursor: Option<PageCursor>) -> PurgeResult<KeyPage>;

    /// Delete one record by primary key
    async fn delete_record(&self, key: &RecordKey) -> PurgeResult<()>;
}
