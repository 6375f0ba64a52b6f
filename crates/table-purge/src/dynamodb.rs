//! AWS DynamoDB Record Table Implementation
//!
//! Backs `RecordTable` with the AWS SDK. Counting uses `Scan` with
//! `Select=COUNT`, key enumeration uses `Scan` projected to the hash key, and
//! deletes are single `DeleteItem` calls. Both scans follow `LastEvaluatedKey`.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_dynamodb::types::{AttributeValue, KeyType, Select, TableStatus};

use crate::config::PurgeConfig;
use crate::error::{PurgeError, PurgeResult};
use crate::traits::{KeyPage, PageCursor, RecordKey, RecordTable};

const KEY_PLACEHOLDER: &str = "#pk";
const ACTIVE_POLL_ATTEMPTS: u32 = 12;
const ACTIVE_POLL_INTERVAL_SECS: u64 = 5;
const ACCESS_DENIED_CODE: &str = "AccessDeniedException";

/// DynamoDB-backed record table
pub struct DynamoDbTable {
    config: PurgeConfig,
    client: Client,
}

impl DynamoDbTable {
    /// Open a handle using the default AWS credential chain and the configured region
    pub async fn with_config(config: PurgeConfig) -> PurgeResult<Self> {
        config.validate()?;

        info!(
            "Opening DynamoDB table: {} in region: {}",
            config.table_name, config.region
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            info!("Using DynamoDB endpoint override: {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }
        let aws_config = loader.load().await;

        let table = Self::from_client(Client::new(&aws_config), config);
        table.verify_table_schema().await?;

        info!(
            "DynamoDB table '{}' is ready in region: {}",
            table.config.table_name, table.config.region
        );
        Ok(table)
    }

    /// Wrap an already-built client without checking the table
    pub fn from_client(client: Client, config: PurgeConfig) -> Self {
        Self { config, client }
    }

    /// Check the table exists, is usable and is keyed by the configured attribute
    async fn verify_table_schema(&self) -> PurgeResult<()> {
        debug!("Verifying table schema for: {}", self.config.table_name);

        let output = match self
            .client
            .describe_table()
            .table_name(&self.config.table_name)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if is_access_denied(err.code()) => {
                // Scan and DeleteItem may still be allowed; they fail on their own if not
                warn!(
                    "Not allowed to describe table '{}', skipping schema check: {}",
                    self.config.table_name,
                    DisplayErrorContext(&err)
                );
                return Ok(());
            }
            Err(err) => {
                return Err(
                    if err
                        .as_service_error()
                        .is_some_and(|e| e.is_resource_not_found_exception())
                    {
                        PurgeError::TableNotFound(self.config.table_name.clone())
                    } else {
                        PurgeError::AwsError(format!(
                            "Failed to describe table '{}': {}",
                            self.config.table_name,
                            DisplayErrorContext(&err)
                        ))
                    },
                );
            }
        };

        let Some(table) = output.table() else {
            return Err(PurgeError::TableNotFound(format!(
                "{} (no description returned)",
                self.config.table_name
            )));
        };

        let hash_key = table
            .key_schema()
            .iter()
            .find(|element| element.key_type() == &KeyType::Hash)
            .map(|element| element.attribute_name().to_string())
            .unwrap_or_default();
        if hash_key != self.config.key_attribute {
            return Err(PurgeError::KeySchemaMismatch {
                expected: self.config.key_attribute.clone(),
                actual: hash_key,
            });
        }
        if table.key_schema().len() > 1 {
            warn!(
                "Table '{}' has a composite key; deletes only send '{}'",
                self.config.table_name, self.config.key_attribute
            );
        }

        match table.table_status() {
            Some(TableStatus::Active) => {
                debug!("DynamoDB table '{}' is active", self.config.table_name);
                Ok(())
            }
            Some(TableStatus::Creating) | Some(TableStatus::Updating) => {
                warn!(
                    "DynamoDB table '{}' is not active yet, waiting",
                    self.config.table_name
                );
                self.wait_for_table_active().await
            }
            status => Err(PurgeError::AwsError(format!(
                "Table '{}' is not usable (status: {:?})",
                self.config.table_name, status
            ))),
        }
    }

    async fn wait_for_table_active(&self) -> PurgeResult<()> {
        use tokio::time::{Duration, sleep};

        for attempt in 1..=ACTIVE_POLL_ATTEMPTS {
            sleep(Duration::from_secs(ACTIVE_POLL_INTERVAL_SECS)).await;

            match self
                .client
                .describe_table()
                .table_name(&self.config.table_name)
                .send()
                .await
            {
                Ok(output) => {
                    if let Some(table) = output.table()
                        && let Some(TableStatus::Active) = table.table_status()
                    {
                        info!("Table '{}' is now active", self.config.table_name);
                        return Ok(());
                    }
                }
                Err(err) => {
                    warn!(
                        "Error checking table status on attempt {}: {}",
                        attempt,
                        DisplayErrorContext(&err)
                    );
                }
            }

            debug!(
                "Table not ready (attempt {}/{})",
                attempt, ACTIVE_POLL_ATTEMPTS
            );
        }

        Err(PurgeError::AwsError(format!(
            "Table '{}' did not become active within {} seconds",
            self.config.table_name,
            u64::from(ACTIVE_POLL_ATTEMPTS) * ACTIVE_POLL_INTERVAL_SECS
        )))
    }
}

/// Whether an error code means the caller lacks permission for the action
fn is_access_denied(code: Option<&str>) -> bool {
    code == Some(ACCESS_DENIED_CODE)
}

/// Convert a `LastEvaluatedKey` into an opaque cursor
fn cursor_from_key(key: &HashMap<String, AttributeValue>) -> PurgeResult<PageCursor> {
    let mut attributes = BTreeMap::new();
    for (name, value) in key {
        let value = value.as_s().map_err(|_| {
            PurgeError::MalformedItem(format!(
                "continuation key attribute '{}' is not a string",
                name
            ))
        })?;
        attributes.insert(name.clone(), value.clone());
    }
    Ok(PageCursor::new(attributes))
}

/// Convert a cursor back into an `ExclusiveStartKey`
fn key_from_cursor(cursor: &PageCursor) -> HashMap<String, AttributeValue> {
    cursor
        .attributes()
        .map(|(name, value)| (name.to_string(), AttributeValue::S(value.to_string())))
        .collect()
}

/// Pull the key attribute out of a projected item
fn record_key_from_item(
    item: &HashMap<String, AttributeValue>,
    key_attribute: &str,
) -> PurgeResult<RecordKey> {
    match item.get(key_attribute) {
        Some(AttributeValue::S(value)) => Ok(RecordKey::new(value.clone())),
        Some(other) => Err(PurgeError::MalformedItem(format!(
            "attribute '{}' is not a string: {:?}",
            key_attribute, other
        ))),
        None => Err(PurgeError::MalformedItem(format!(
            "item is missing attribute '{}'",
            key_attribute
        ))),
    }
}

#[async_trait]
impl RecordTable for DynamoDbTable {
    fn backend_name(&self) -> &'static str {
        "DynamoDB"
    }

    fn table_name(&self) -> &str {
        &self.config.table_name
    }

    async fn count_records(&self) -> PurgeResult<usize> {
        let mut total = 0usize;
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        // A COUNT scan still stops at 1 MB per response
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.config.table_name)
                .select(Select::Count)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|err| {
                    PurgeError::AwsError(format!(
                        "Failed to count records in '{}': {}",
                        self.config.table_name,
                        DisplayErrorContext(&err)
                    ))
                })?;

            total += usize::try_from(output.count()).unwrap_or_default();
            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        debug!("DynamoDB record count for '{}': {}", self.config.table_name, total);
        Ok(total)
    }

    async fn scan_keys(&self, cursor: Option<PageCursor>) -> PurgeResult<KeyPage> {
        let output = self
            .client
            .scan()
            .table_name(&self.config.table_name)
            .projection_expression(KEY_PLACEHOLDER)
            .expression_attribute_names(KEY_PLACEHOLDER, &self.config.key_attribute)
            .set_limit(self.config.page_size)
            .set_exclusive_start_key(cursor.as_ref().map(key_from_cursor))
            .send()
            .await
            .map_err(|err| {
                PurgeError::AwsError(format!(
                    "Failed to scan keys from '{}': {}",
                    self.config.table_name,
                    DisplayErrorContext(&err)
                ))
            })?;

        let mut keys = Vec::with_capacity(output.items().len());
        for item in output.items() {
            match record_key_from_item(item, &self.config.key_attribute) {
                Ok(key) => keys.push(key),
                Err(e) => warn!("Skipping item without usable key: {}", e),
            }
        }

        let next_cursor = match output.last_evaluated_key() {
            Some(key) if !key.is_empty() => Some(cursor_from_key(key)?),
            _ => None,
        };

        debug!(
            "Scanned {} keys from '{}' (more: {})",
            keys.len(),
            self.config.table_name,
            next_cursor.is_some()
        );
        Ok(KeyPage { keys, next_cursor })
    }

    async fn delete_record(&self, key: &RecordKey) -> PurgeResult<()> {
        self.client
            .delete_item()
            .table_name(&self.config.table_name)
            .key(
                self.config.key_attribute.clone(),
                AttributeValue::S(key.as_str().to_string()),
            )
            .send()
            .await
            .map_err(|err| PurgeError::AwsError(DisplayErrorContext(&err).to_string()))?;

        debug!("Deleted record '{}' from '{}'", key, self.config.table_name);
        Ok(())
    }
}
