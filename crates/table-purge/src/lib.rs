//! # Table Purge
//!
//! **Count, confirm and delete every record in a DynamoDB table.**
//!
//! A one-shot maintenance tool for clearing test data before a production
//! cutover. The run is strictly sequential:
//!
//! 1. count the records (count-only scan)
//! 2. ask the operator to type the confirmation token
//! 3. collect every primary key, following scan pagination
//! 4. delete each record by key, tallying successes and failures
//! 5. count again and report what remains
//!
//! ## Quick Start
//!
//! ```rust
//! use table_purge::prelude::*;
//!
//! # async fn example() -> Result<(), PurgeError> {
//! let table = InMemoryTable::with_keys(["order-1", "order-2"], 100).await;
//! let config = PurgeConfig::default();
//!
//! let mut confirmation = LineConfirmation::new(&b"SIM\n"[..], Vec::new());
//! let mut observer = RecordingObserver::new();
//!
//! let outcome = TablePurger::new(&table, &config)
//!     .run(&mut confirmation, &mut observer)
//!     .await?;
//! assert!(matches!(outcome, PurgeOutcome::Completed(ref s) if s.is_clean()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`RecordTable` trait**: count, paged key scan and delete by key
//! - **`DynamoDbTable`**: AWS SDK backend (feature `dynamodb`)
//! - **`InMemoryTable`**: ordered in-memory backend with failure injection (feature `in-memory`)
//! - **`TablePurger`**: the run itself, reporting through `PurgeObserver`

pub mod config;
pub mod confirm;
pub mod error;
pub mod observer;
pub mod prelude;
pub mod purge;
mod traits;

/// Record table trait and key types
pub use traits::*;

#[cfg(feature = "in-memory")]
pub mod in_memory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

pub use config::PurgeConfig;
pub use error::{PurgeError, PurgeResult};
pub use purge::{PurgeOutcome, PurgeSummary, TablePurger};

#[cfg(feature = "in-memory")]
pub use in_memory::{InMemoryConfig, InMemoryTable};

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbTable;
