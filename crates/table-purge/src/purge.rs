//! Purge run: count, confirm, enumerate, delete, verify
//!
//! Each step is a separate function so it can be exercised on its own; the
//! [`TablePurger`] strings them together in order. All remote calls are awaited
//! one at a time.

use tracing::{debug, info, warn};

use crate::config::PurgeConfig;
use crate::confirm::{Confirmation, is_confirmed};
use crate::error::PurgeResult;
use crate::observer::{PurgeEvent, PurgeObserver};
use crate::traits::{RecordKey, RecordTable};

/// Per-item results of the deletion loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionTally {
    pub deleted: usize,
    pub failed: usize,
    /// Keys that could not be deleted, with the error text
    pub failures: Vec<(RecordKey, String)>,
}

/// Totals for a confirmed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeSummary {
    /// Count reported before confirmation
    pub initial_count: usize,
    /// Keys collected by the enumerator
    pub enumerated: usize,
    pub deleted: usize,
    pub failed: usize,
    /// Count reported by the final verification
    pub remaining: usize,
}

impl PurgeSummary {
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.remaining == 0
    }
}

/// How a run ended, short of an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Nothing to delete; no prompt was shown
    AlreadyEmpty,
    /// The operator did not type the confirmation token
    Declined { count: usize },
    Completed(PurgeSummary),
}

/// Process exit status for a finished run
pub const EXIT_SUCCESS: u8 = 0;
/// Process exit status for a failed or interrupted run
pub const EXIT_FAILURE: u8 = 1;

/// Map a run's result to its exit status.
///
/// Every outcome, including a declined prompt, exits with [`EXIT_SUCCESS`];
/// only an error exits with [`EXIT_FAILURE`]. Failed individual deletes are
/// reported in the summary and do not change the status.
pub fn exit_status(result: &PurgeResult<PurgeOutcome>) -> u8 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(_) => EXIT_FAILURE,
    }
}

/// Collect every key in the table, following continuation cursors to the end.
///
/// Keys are returned in the order the pages delivered them.
pub async fn collect_keys<T>(table: &T) -> PurgeResult<Vec<RecordKey>>
where
    T: RecordTable + ?Sized,
{
    let mut keys = Vec::new();
    let mut cursor = None;
    let mut pages = 0usize;

    loop {
        let page = table.scan_keys(cursor).await?;
        pages += 1;
        debug!("Page {} delivered {} keys", pages, page.keys.len());
        keys.extend(page.keys);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!(
        "Collected {} keys from '{}' in {} pages",
        keys.len(),
        table.table_name(),
        pages
    );
    Ok(keys)
}

/// Delete each key in turn. Failures are recorded and the loop moves on.
///
/// A progress event is emitted whenever the success count reaches a multiple
/// of `progress_interval`.
pub async fn delete_keys<T>(
    table: &T,
    keys: &[RecordKey],
    progress_interval: usize,
    observer: &mut dyn PurgeObserver,
) -> DeletionTally
where
    T: RecordTable + ?Sized,
{
    let total = keys.len();
    let interval = progress_interval.max(1);
    let mut tally = DeletionTally::default();

    for key in keys {
        match table.delete_record(key).await {
            Ok(()) => {
                tally.deleted += 1;
                if tally.deleted % interval == 0 {
                    observer.on_event(&PurgeEvent::Progress {
                        deleted: tally.deleted,
                        total,
                    });
                }
            }
            Err(e) => {
                warn!("Failed to delete '{}': {}", key, e);
                tally.failed += 1;
                let error = e.to_string();
                observer.on_event(&PurgeEvent::DeleteFailed {
                    key: key.clone(),
                    error: error.clone(),
                });
                tally.failures.push((key.clone(), error));
            }
        }
    }

    tally
}

/// Runs the full purge sequence against one table
pub struct TablePurger<'a, T: RecordTable + ?Sized> {
    table: &'a T,
    config: &'a PurgeConfig,
}

impl<'a, T: RecordTable + ?Sized> TablePurger<'a, T> {
    pub fn new(table: &'a T, config: &'a PurgeConfig) -> Self {
        Self { table, config }
    }

    pub async fn run(
        &self,
        confirmation: &mut dyn Confirmation,
        observer: &mut dyn PurgeObserver,
    ) -> PurgeResult<PurgeOutcome> {
        observer.on_event(&PurgeEvent::Started {
            table: self.table.table_name().to_string(),
            backend: self.table.backend_name(),
        });

        observer.on_event(&PurgeEvent::Counting);
        let count = self.table.count_records().await?;
        observer.on_event(&PurgeEvent::Counted { count });

        if count == 0 {
            observer.on_event(&PurgeEvent::AlreadyEmpty);
            return Ok(PurgeOutcome::AlreadyEmpty);
        }

        observer.on_event(&PurgeEvent::ConfirmationRequested { count });
        let prompt = format!(
            "\nAre you sure? (type {}): ",
            self.config.confirmation_token
        );
        let answer = confirmation.ask(&prompt).await?;
        if !is_confirmed(&answer, &self.config.confirmation_token) {
            info!("Confirmation declined; nothing deleted");
            observer.on_event(&PurgeEvent::Declined);
            return Ok(PurgeOutcome::Declined { count });
        }

        observer.on_event(&PurgeEvent::Enumerating);
        let keys = collect_keys(self.table).await?;
        observer.on_event(&PurgeEvent::Enumerated { total: keys.len() });

        observer.on_event(&PurgeEvent::Deleting);
        let tally = delete_keys(self.table, &keys, self.config.progress_interval, observer).await;
        observer.on_event(&PurgeEvent::Finished {
            deleted: tally.deleted,
            failed: tally.failed,
        });

        let remaining = self.table.count_records().await?;
        observer.on_event(&PurgeEvent::Verified { remaining });
        if remaining == 0 {
            observer.on_event(&PurgeEvent::Ready);
        }

        Ok(PurgeOutcome::Completed(PurgeSummary {
            initial_count: count,
            enumerated: keys.len(),
            deleted: tally.deleted,
            failed: tally.failed,
            remaining,
        }))
    }
}
