//! Trait seams between the engine and its external collaborators.
//! Everything the engine touches at a suspension point sits behind one of
//! these, so tests can inject in-memory fakes.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::types::{LicenseRecord, ReminderNotice, ThresholdKind};

/// Read-only view of the dashboard's license records.
#[async_trait]
pub trait RecordsSource: Send + Sync {
    /// All licenses with a non-null expiry date, joined with the owning
    /// employee's display name and delivery address.
    async fn fetch_licenses(&self) -> Result<Vec<LicenseRecord>>;
}

/// Durable record of which reminders have already been delivered.
///
/// Keys are `(license_id, cycle, kind)` where `cycle` is the license's expiry
/// date at send time — a renewed license (new expiry date) therefore starts a
/// fresh notification cycle without any reset operation.
#[async_trait]
pub trait ReminderLedger: Send + Sync {
    async fn has_sent(
        &self,
        license_id: &str,
        cycle: NaiveDate,
        kind: ThresholdKind,
    ) -> Result<bool>;

    /// Record a confirmed delivery. Compare-and-set: returns `true` when this
    /// call created the entry, `false` when it already existed. A second call
    /// for the same key is a no-op, never an error.
    async fn mark_sent(
        &self,
        license_id: &str,
        cycle: NaiveDate,
        kind: ThresholdKind,
    ) -> Result<bool>;
}

/// A delivery channel for rendered reminders.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver one notice. Channel errors come back as `Err` — callers decide
    /// whether to count or retry, the channel never aborts a batch.
    async fn send(&self, notice: &ReminderNotice) -> Result<()>;
}
