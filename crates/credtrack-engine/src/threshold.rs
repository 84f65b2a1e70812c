//! Threshold crossing detection — decides whether a license has reached a
//! reminder milestone that has not fired yet.
//!
//! Only the *current* band's threshold is ever considered. A license that
//! sat unscanned long enough to skip bands gets exactly one reminder (for
//! the band it is in now); the skipped milestones stay skipped for that
//! expiry cycle. No catch-up.

use chrono::{DateTime, Utc};

use credtrack_core::error::Result;
use credtrack_core::traits::ReminderLedger;
use credtrack_core::types::{LicenseRecord, ThresholdKind, UrgencyBand};

use crate::lifecycle::classify;

/// The single reminder milestone a band represents, if any.
pub fn band_threshold(band: UrgencyBand) -> Option<ThresholdKind> {
    match band {
        UrgencyBand::Upcoming => None,
        UrgencyBand::Warning => Some(ThresholdKind::ThirtyDay),
        UrgencyBand::Urgent => Some(ThresholdKind::SevenDay),
        UrgencyBand::Expired => Some(ThresholdKind::Expired),
    }
}

/// Threshold pending for this license at `reference`, or None when the
/// current band carries no milestone or the ledger already has it.
pub async fn pending_threshold(
    license: &LicenseRecord,
    reference: DateTime<Utc>,
    ledger: &dyn ReminderLedger,
) -> Result<Option<ThresholdKind>> {
    let classification = classify(license.expiry_date, reference);
    let Some(kind) = band_threshold(classification.band) else {
        return Ok(None);
    };
    if ledger.has_sent(&license.id, license.expiry_date, kind).await? {
        Ok(None)
    } else {
        Ok(Some(kind))
    }
}
