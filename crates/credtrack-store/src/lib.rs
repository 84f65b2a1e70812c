//! # CredTrack Store
//! SQLite persistence: a read-only view over the dashboard's license records,
//! and the durable reminder ledger the engine writes after each confirmed
//! delivery. Both survive restarts and are shared across scan runners.

pub mod ledger;
pub mod records;

pub use ledger::{MemoryLedger, SqliteLedger};
pub use records::SqliteRecords;
