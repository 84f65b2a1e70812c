//! Core data model for the expiry reminder engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A license row joined with its owning employee, as read from the records
/// store. Read-only input to the engine — nothing here is ever written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Unique license ID.
    pub id: String,
    /// Owning employee ID.
    pub employee_id: String,
    /// Free-form license type label (e.g. "Registered Nurse").
    pub license_type: String,
    /// Free-form license number.
    pub license_number: String,
    /// Calendar expiry date. Rows without one never enter a scan.
    pub expiry_date: NaiveDate,
    /// Informational only — not used for classification.
    pub issue_date: Option<NaiveDate>,
    /// Employee display name (joined).
    pub employee_name: String,
    /// Employee delivery address (joined).
    pub employee_email: String,
}

/// Urgency classification of a license relative to its expiry date.
/// Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgencyBand {
    /// More than 30 days out.
    Upcoming,
    /// 30 days or less, more than 7.
    Warning,
    /// 7 days or less, not yet expired.
    Urgent,
    /// Past the expiry date.
    Expired,
}

/// A reminder milestone. Fires at most once per license per expiry cycle.
/// Variant order is the lifecycle order — a license moves through thresholds
/// monotonically as its expiry date approaches and passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThresholdKind {
    ThirtyDay,
    SevenDay,
    Expired,
}

impl ThresholdKind {
    /// Stable string key used in ledger storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdKind::ThirtyDay => "thirty_day",
            ThresholdKind::SevenDay => "seven_day",
            ThresholdKind::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "thirty_day" => Some(ThresholdKind::ThirtyDay),
            "seven_day" => Some(ThresholdKind::SevenDay),
            "expired" => Some(ThresholdKind::Expired),
            _ => None,
        }
    }
}

impl std::fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully rendered reminder, ready to hand to a delivery channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderNotice {
    /// Delivery address (employee email).
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// Structured fields for channels that want more than plain text.
    pub metadata: NoticeMetadata,
}

/// Structured notice fields, carried alongside the rendered text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeMetadata {
    pub employee_name: String,
    pub license_type: String,
    pub license_number: String,
    pub expiry_date: NaiveDate,
    pub days_until_expiry: i64,
    pub threshold: ThresholdKind,
}

/// Aggregate result of one scan pass — the sole observable output of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// License rows examined.
    pub checked: u32,
    /// Reminders confirmed delivered.
    pub sent: u32,
    /// Failures (delivery failures, plus one for a failed bulk fetch).
    pub errors: u32,
}

impl ScanOutcome {
    pub fn aborted() -> Self {
        Self { checked: 0, sent: 0, errors: 1 }
    }
}
