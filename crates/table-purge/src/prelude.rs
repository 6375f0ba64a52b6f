//! # Table Purge Prelude
//!
//! ```rust
//! use table_purge::prelude::*;
//! ```

pub use crate::config::PurgeConfig;
pub use crate::confirm::{Confirmation, LineConfirmation, StdinConfirmation, is_confirmed};
pub use crate::error::{PurgeError, PurgeResult};
pub use crate::observer::{ConsoleObserver, PurgeEvent, PurgeObserver, RecordingObserver};
pub use crate::purge::{
    DeletionTally, EXIT_FAILURE, EXIT_SUCCESS, PurgeOutcome, PurgeSummary, TablePurger,
    collect_keys, delete_keys, exit_status,
};
pub use crate::traits::{KeyPage, PageCursor, RecordKey, RecordTable};

#[cfg(feature = "in-memory")]
pub use crate::in_memory::{InMemoryConfig, InMemoryTable};

#[cfg(feature = "dynamodb")]
pub use crate::dynamodb::DynamoDbTable;
