//! Purge progress events and their console rendering
//!
//! The run emits [`PurgeEvent`]s instead of printing directly. The CLI renders
//! them as human-readable text with [`ConsoleObserver`]; tests collect them with
//! [`RecordingObserver`].

use std::io::Write;

use crate::traits::RecordKey;

const RULE_WIDTH: usize = 50;

/// Something that happened during a purge run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeEvent {
    Started { table: String, backend: &'static str },
    Counting,
    Counted { count: usize },
    AlreadyEmpty,
    ConfirmationRequested { count: usize },
    Declined,
    Enumerating,
    Enumerated { total: usize },
    Deleting,
    Progress { deleted: usize, total: usize },
    DeleteFailed { key: RecordKey, error: String },
    Finished { deleted: usize, failed: usize },
    Verified { remaining: usize },
    Ready,
}

/// Receives events as the purge advances
pub trait PurgeObserver: Send {
    fn on_event(&mut self, event: &PurgeEvent);
}

/// Renders events as console text
pub struct ConsoleObserver<W> {
    out: W,
}

impl ConsoleObserver<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn banner(&mut self, title: &str) -> std::io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "{rule}")
    }

    fn render(&mut self, event: &PurgeEvent) -> std::io::Result<()> {
        let written = match event {
            PurgeEvent::Started { table, backend } => {
                writeln!(self.out)?;
                self.banner(&format!("PURGE TEST RECORDS: {table} ({backend})"))?;
                writeln!(self.out)
            }
            PurgeEvent::Counting => writeln!(self.out, "[1/3] Counting records..."),
            PurgeEvent::Counted { count } => {
                writeln!(self.out, "Records found: {count}\n")
            }
            PurgeEvent::AlreadyEmpty => writeln!(self.out, "✅ Table is already empty!\n"),
            PurgeEvent::ConfirmationRequested { count } => writeln!(
                self.out,
                "⚠️  WARNING: this will delete ALL {count} records!"
            ),
            PurgeEvent::Declined => writeln!(self.out, "\n❌ Operation cancelled.\n"),
            PurgeEvent::Enumerating => writeln!(self.out, "\n[2/3] Fetching record keys..."),
            PurgeEvent::Enumerated { total } => {
                writeln!(self.out, "Records to delete: {total}\n")
            }
            PurgeEvent::Deleting => writeln!(self.out, "[3/3] Deleting records..."),
            PurgeEvent::Progress { deleted, total } => {
                writeln!(self.out, "  Progress: {deleted}/{total}")
            }
            PurgeEvent::DeleteFailed { key, error } => {
                writeln!(self.out, "  ✗ Error: {key}: {error}")
            }
            PurgeEvent::Finished { deleted, failed } => {
                writeln!(self.out)?;
                self.banner("PURGE COMPLETE!")?;
                writeln!(self.out, "✅ Deleted: {deleted}")?;
                writeln!(self.out, "❌ Failed: {failed}")
            }
            PurgeEvent::Verified { remaining } => {
                writeln!(self.out, "Remaining: {remaining}\n")
            }
            PurgeEvent::Ready => writeln!(self.out, "✅ Table is ready for production!\n"),
        };
        written?;
        self.out.flush()
    }
}

impl<W: Write + Send> PurgeObserver for ConsoleObserver<W> {
    fn on_event(&mut self, event: &PurgeEvent) {
        if let Err(e) = self.render(event) {
            tracing::warn!("Failed to write console output: {}", e);
        }
    }
}

/// Keeps every event for later inspection
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<PurgeEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(deleted, total)` of every progress event, in order
    pub fn progress(&self) -> Vec<(usize, usize)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                PurgeEvent::Progress { deleted, total } => Some((*deleted, *total)),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, event: &PurgeEvent) -> bool {
        self.events.contains(event)
    }
}

impl PurgeObserver for RecordingObserver {
    fn on_event(&mut self, event: &PurgeEvent) {
        self.events.push(event.clone());
    }
}
