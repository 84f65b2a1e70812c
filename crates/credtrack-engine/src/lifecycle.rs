//! Lifecycle classification — pure calendar-date arithmetic, no state.
//!
//! Both inputs are normalized to UTC calendar dates before subtraction, so
//! the time-of-day of the reference clock can never flip a band at the day
//! boundary. The same function backs scan classification and the gateway's
//! urgency summary, which keeps the threshold constants in one place.

use chrono::{DateTime, NaiveDate, Utc};

use credtrack_core::types::UrgencyBand;

/// Result of classifying one license against a reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whole calendar days until expiry. Negative once expired.
    pub days_remaining: i64,
    pub band: UrgencyBand,
}

/// Classify a license expiry date against a reference time.
pub fn classify(expiry: NaiveDate, reference: DateTime<Utc>) -> Classification {
    let days_remaining = (expiry - reference.date_naive()).num_days();
    let band = if days_remaining < 0 {
        UrgencyBand::Expired
    } else if days_remaining <= 7 {
        UrgencyBand::Urgent
    } else if days_remaining <= 30 {
        UrgencyBand::Warning
    } else {
        UrgencyBand::Upcoming
    };
    Classification {
        days_remaining,
        band,
    }
}
