//! End-to-end purge runs against the in-memory table
//!
//! Each test drives `TablePurger::run` with scripted operator input and checks
//! the delete calls the table saw plus the events the run reported.

use async_trait::async_trait;
use table_purge::prelude::*;

/// Answers every prompt with a fixed line and counts how often it was asked
struct ScriptedConfirmation {
    answer: String,
    asked: usize,
}

impl ScriptedConfirmation {
    fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            asked: 0,
        }
    }
}

#[async_trait]
impl Confirmation for ScriptedConfirmation {
    async fn ask(&mut self, _prompt: &str) -> PurgeResult<String> {
        self.asked += 1;
        Ok(self.answer.clone())
    }
}

fn order_ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("order-{:04}", i)).collect()
}

async fn run_with(
    table: &InMemoryTable,
    confirmation: &mut ScriptedConfirmation,
) -> (PurgeOutcome, RecordingObserver) {
    let config = PurgeConfig::default();
    let mut observer = RecordingObserver::new();
    let outcome = TablePurger::new(table, &config)
        .run(confirmation, &mut observer)
        .await
        .expect("purge run should not error");
    (outcome, observer)
}

#[tokio::test]
async fn test_confirmed_run_empties_table() {
    let table = InMemoryTable::with_keys(order_ids(23), 10).await;
    let mut confirmation = ScriptedConfirmation::answering("SIM");

    let (outcome, observer) = run_with(&table, &mut confirmation).await;

    let PurgeOutcome::Completed(summary) = outcome else {
        panic!("expected a completed run, got {:?}", outcome);
    };
    assert_eq!(
        summary,
        PurgeSummary {
            initial_count: 23,
            enumerated: 23,
            deleted: 23,
            failed: 0,
            remaining: 0,
        }
    );
    assert_eq!(confirmation.asked, 1);
    // Three pages of 10, 10 and 3 keys
    assert_eq!(table.scan_calls(), 3);
    assert_eq!(table.delete_calls().await.len(), 23);
    assert_eq!(table.count_calls(), 2);
    assert!(table.remaining_keys().await.is_empty());

    assert_eq!(observer.progress(), vec![(10, 23), (20, 23)]);
    assert!(observer.contains(&PurgeEvent::Finished {
        deleted: 23,
        failed: 0
    }));
    assert!(observer.contains(&PurgeEvent::Verified { remaining: 0 }));
    assert_eq!(observer.events.last(), Some(&PurgeEvent::Ready));
}

#[tokio::test]
async fn test_declined_confirmation_deletes_nothing() {
    for answer in ["", "sim", "Sim", "SIM ", " SIM", "yes", "NO"] {
        let table = InMemoryTable::with_keys(order_ids(5), 10).await;
        let mut confirmation = ScriptedConfirmation::answering(answer);

        let (outcome, observer) = run_with(&table, &mut confirmation).await;

        assert_eq!(outcome, PurgeOutcome::Declined { count: 5 }, "answer {:?}", answer);
        assert!(table.delete_calls().await.is_empty());
        assert_eq!(table.scan_calls(), 0);
        assert_eq!(table.remaining_keys().await.len(), 5);
        assert_eq!(observer.events.last(), Some(&PurgeEvent::Declined));
    }
}

#[tokio::test]
async fn test_empty_table_skips_prompt() {
    let table = InMemoryTable::new();
    let mut confirmation = ScriptedConfirmation::answering("SIM");

    let (outcome, observer) = run_with(&table, &mut confirmation).await;

    assert_eq!(outcome, PurgeOutcome::AlreadyEmpty);
    assert_eq!(confirmation.asked, 0);
    assert_eq!(table.count_calls(), 1);
    assert_eq!(table.scan_calls(), 0);
    assert!(table.delete_calls().await.is_empty());
    assert!(!observer
        .events
        .iter()
        .any(|e| matches!(e, PurgeEvent::ConfirmationRequested { .. })));
}

#[tokio::test]
async fn test_enumeration_collects_every_page_once() {
    let ids = order_ids(9);
    let table = InMemoryTable::with_keys(ids.clone(), 3).await;

    let keys = collect_keys(&table).await.unwrap();

    assert_eq!(table.scan_calls(), 3);
    let collected: Vec<String> = keys.into_iter().map(RecordKey::into_inner).collect();
    assert_eq!(collected, ids);
}

#[tokio::test]
async fn test_failed_item_does_not_halt_loop() {
    let ids = order_ids(5);
    let table = InMemoryTable::with_keys(ids.clone(), 10).await;
    table.fail_deletes_for(ids[2].as_str()).await;
    let mut confirmation = ScriptedConfirmation::answering("SIM");

    let (outcome, observer) = run_with(&table, &mut confirmation).await;

    let PurgeOutcome::Completed(summary) = outcome else {
        panic!("expected a completed run, got {:?}", outcome);
    };
    assert_eq!(summary.deleted, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.remaining, 1);
    assert!(!summary.is_clean());

    // Items 4 and 5 were still attempted after item 3 failed
    let attempted: Vec<String> = table
        .delete_calls()
        .await
        .into_iter()
        .map(RecordKey::into_inner)
        .collect();
    assert_eq!(attempted, ids);

    assert!(observer.events.iter().any(|e| matches!(
        e,
        PurgeEvent::DeleteFailed { key, .. } if key.as_str() == "order-0002"
    )));
    assert!(!observer.contains(&PurgeEvent::Ready));
}

#[tokio::test]
async fn test_progress_only_at_multiples_of_interval() {
    let table = InMemoryTable::with_keys(order_ids(25), 7).await;
    let mut confirmation = ScriptedConfirmation::answering("SIM");

    let (_, observer) = run_with(&table, &mut confirmation).await;

    assert_eq!(observer.progress(), vec![(10, 25), (20, 25)]);
}

#[tokio::test]
async fn test_custom_token_and_interval() {
    let table = InMemoryTable::with_keys(order_ids(6), 10).await;
    let config = PurgeConfig {
        confirmation_token: "DELETE".to_string(),
        progress_interval: 3,
        ..PurgeConfig::default()
    };
    let mut observer = RecordingObserver::new();

    let mut declined = ScriptedConfirmation::answering("SIM");
    let outcome = TablePurger::new(&table, &config)
        .run(&mut declined, &mut observer)
        .await
        .unwrap();
    assert_eq!(outcome, PurgeOutcome::Declined { count: 6 });

    let mut accepted = ScriptedConfirmation::answering("DELETE");
    let mut observer = RecordingObserver::new();
    TablePurger::new(&table, &config)
        .run(&mut accepted, &mut observer)
        .await
        .unwrap();
    assert_eq!(observer.progress(), vec![(3, 6), (6, 6)]);
}

#[tokio::test]
async fn test_failed_first_count_stops_before_prompt() {
    let table = InMemoryTable::with_keys(order_ids(4), 10).await;
    table.fail_counts();
    let config = PurgeConfig::default();
    let mut confirmation = ScriptedConfirmation::answering("SIM");
    let mut observer = RecordingObserver::new();

    let result = TablePurger::new(&table, &config)
        .run(&mut confirmation, &mut observer)
        .await;

    assert!(matches!(result, Err(PurgeError::AwsError(_))));
    assert_eq!(exit_status(&result), EXIT_FAILURE);
    assert_eq!(confirmation.asked, 0);
    assert_eq!(table.count_calls(), 1);
    assert_eq!(table.scan_calls(), 0);
    assert!(table.delete_calls().await.is_empty());
    assert_eq!(table.remaining_keys().await.len(), 4);
}

#[tokio::test]
async fn test_scan_failure_after_confirmation_deletes_nothing() {
    let table = InMemoryTable::with_keys(order_ids(4), 10).await;
    table.fail_scans();
    let config = PurgeConfig::default();
    let mut confirmation = ScriptedConfirmation::answering("SIM");
    let mut observer = RecordingObserver::new();

    let result = TablePurger::new(&table, &config)
        .run(&mut confirmation, &mut observer)
        .await;

    assert!(matches!(result, Err(PurgeError::AwsError(_))));
    assert_eq!(exit_status(&result), EXIT_FAILURE);
    assert_eq!(confirmation.asked, 1);
    assert_eq!(table.scan_calls(), 1);
    assert!(table.delete_calls().await.is_empty());
    assert_eq!(table.remaining_keys().await.len(), 4);
    assert!(!observer
        .events
        .iter()
        .any(|e| matches!(e, PurgeEvent::Deleting { .. } | PurgeEvent::Finished { .. })));
}

#[tokio::test]
async fn test_console_transcript_with_stdin_style_input() {
    let table = InMemoryTable::with_keys(order_ids(2), 10).await;
    let config = PurgeConfig::default();
    let mut confirmation = LineConfirmation::new(&b"SIM\r\n"[..], Vec::new());
    let mut console = ConsoleObserver::new(Vec::new());

    let outcome = TablePurger::new(&table, &config)
        .run(&mut confirmation, &mut console)
        .await
        .unwrap();
    assert!(matches!(outcome, PurgeOutcome::Completed(ref s) if s.is_clean()));

    let prompt = String::from_utf8(confirmation.into_writer()).unwrap();
    assert_eq!(prompt, "\nAre you sure? (type SIM): ");

    let transcript = String::from_utf8(console.into_inner()).unwrap();
    assert!(transcript.contains("Records found: 2"));
    assert!(transcript.contains("⚠️  WARNING: this will delete ALL 2 records!"));
    assert!(transcript.contains("Records to delete: 2"));
    assert!(transcript.contains("✅ Deleted: 2"));
    assert!(transcript.contains("❌ Failed: 0"));
    assert!(transcript.contains("Remaining: 0"));
    assert!(transcript.contains("✅ Table is ready for production!"));
}

#[tokio::test]
async fn test_prompt_names_configured_token() {
    let table = InMemoryTable::with_keys(order_ids(1), 10).await;
    let config = PurgeConfig {
        confirmation_token: "DELETE".to_string(),
        ..PurgeConfig::default()
    };
    let mut confirmation = LineConfirmation::new(&b"SIM\n"[..], Vec::new());
    let mut observer = RecordingObserver::new();

    let outcome = TablePurger::new(&table, &config)
        .run(&mut confirmation, &mut observer)
        .await
        .unwrap();

    assert_eq!(outcome, PurgeOutcome::Declined { count: 1 });
    let prompt = String::from_utf8(confirmation.into_writer()).unwrap();
    assert_eq!(prompt, "\nAre you sure? (type DELETE): ");
}
