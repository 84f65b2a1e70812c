//! # CredTrack Core
//! Shared foundation for the expiry reminder engine: data model, error type,
//! configuration, and the trait seams the engine is wired through.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::CredTrackConfig;
pub use error::{CredTrackError, Result};
pub use traits::{Notifier, RecordsSource, ReminderLedger};
pub use types::{LicenseRecord, ReminderNotice, ScanOutcome, ThresholdKind, UrgencyBand};
