//! Purge configuration
//!
//! Everything the purge needs to know about its target is carried here and
//! passed explicitly, so the same run logic can point at any table or region.

use crate::error::{PurgeError, PurgeResult};

/// Default table targeted when no override is given
pub const DEFAULT_TABLE_NAME: &str = "natal-orders";
/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";
/// Default primary (hash) key attribute
pub const DEFAULT_KEY_ATTRIBUTE: &str = "orderId";
/// Literal the operator must type to proceed
pub const DEFAULT_CONFIRMATION_TOKEN: &str = "SIM";
/// Successful deletions between progress lines
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;

/// Configuration for a purge run
#[derive(Debug, Clone)]
pub struct PurgeConfig {
    /// Table to empty
    pub table_name: String,
    /// AWS region the table lives in
    pub region: String,
    /// Name of the primary key attribute used for projection and deletes
    pub key_attribute: String,
    /// Exact, case-sensitive confirmation literal
    pub confirmation_token: String,
    /// Report progress every N successful deletions
    pub progress_interval: usize,
    /// Optional scan page size (`Limit`); the service default is 1 MB pages
    pub page_size: Option<i32>,
    /// Optional endpoint override for DynamoDB Local or LocalStack
    pub endpoint_url: Option<String>,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            region: DEFAULT_REGION.to_string(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
            confirmation_token: DEFAULT_CONFIRMATION_TOKEN.to_string(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            page_size: None,
            endpoint_url: None,
        }
    }
}

impl PurgeConfig {
    /// Create a configuration targeting the given table with all other defaults
    pub fn for_table(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Reject configurations that could never complete a run
    pub fn validate(&self) -> PurgeResult<()> {
        if self.table_name.trim().is_empty() {
            return Err(PurgeError::InvalidConfig(
                "table name must not be empty".to_string(),
            ));
        }
        if self.region.trim().is_empty() {
            return Err(PurgeError::InvalidConfig(
                "region must not be empty".to_string(),
            ));
        }
        if self.key_attribute.trim().is_empty() {
            return Err(PurgeError::InvalidConfig(
                "key attribute must not be empty".to_string(),
            ));
        }
        if self.confirmation_token.is_empty() {
            return Err(PurgeError::InvalidConfig(
                "confirmation token must not be empty".to_string(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(PurgeError::InvalidConfig(
                "progress interval must be at least 1".to_string(),
            ));
        }
        if let Some(page_size) = self.page_size
            && page_size <= 0
        {
            return Err(PurgeError::InvalidConfig(format!(
                "page size must be positive, got {}",
                page_size
            )));
        }
        Ok(())
    }
}
