//! # CredTrack Engine
//! The license expiry lifecycle and reminder dispatch engine.
//!
//! ## Architecture
//! ```text
//! ScanOrchestrator.run_scan(reference)        (serialized by a scan mutex)
//!   ├── RecordsSource: all licenses + owning employee      (bulk fetch)
//!   ├── per record:
//!   │     classify(expiry, reference)      → band + day count (pure)
//!   │     pending_threshold(…, ledger)     → first-time threshold or None
//!   │     ReminderDispatcher.send(…)       → render + channel delivery
//!   │     ledger.mark_sent(…)              → CAS, only after confirmed send
//!   └── returns {checked, sent, errors}
//! ```
//!
//! Repeating a scan is always safe: the ledger makes each
//! (license, cycle, threshold) key fire at most once on the success path.

pub mod dispatch;
pub mod lifecycle;
pub mod scan;
pub mod threshold;

pub use dispatch::ReminderDispatcher;
pub use lifecycle::{Classification, classify};
pub use scan::{ScanOrchestrator, spawn_scan_loop};
pub use threshold::{band_threshold, pending_threshold};
