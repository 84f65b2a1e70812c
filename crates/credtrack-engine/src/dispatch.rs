//! Reminder dispatch — renders the human-facing message for a threshold and
//! hands it to the injected delivery channel.
//!
//! Framing varies by milestone: an expired license gets urgent "already
//! expired" language, the seven-day milestone is a final reminder, the
//! thirty-day milestone is informational. Day counts at the boundary get
//! distinct phrasing ("expires today", not "expires in 0 days").

use chrono::{DateTime, Utc};
use std::sync::Arc;

use credtrack_core::error::Result;
use credtrack_core::traits::Notifier;
use credtrack_core::types::{LicenseRecord, NoticeMetadata, ReminderNotice, ThresholdKind};

use crate::lifecycle::classify;

pub struct ReminderDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl ReminderDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn channel_name(&self) -> &str {
        self.notifier.name()
    }

    /// Render and deliver one reminder. Failure comes back as `Err` so the
    /// orchestrator can count it and move on — never a panic, never a batch
    /// abort.
    pub async fn send(
        &self,
        license: &LicenseRecord,
        kind: ThresholdKind,
        reference: DateTime<Utc>,
    ) -> Result<()> {
        let days = classify(license.expiry_date, reference).days_remaining;
        let notice = render(license, kind, days);
        self.notifier.send(&notice).await
    }
}

/// Build the notice for a license/threshold/day-count tuple.
pub fn render(license: &LicenseRecord, kind: ThresholdKind, days_remaining: i64) -> ReminderNotice {
    let phrase = day_phrase(days_remaining);
    let expiry = license.expiry_date.format("%d %b %Y");

    let (subject, framing, closing) = match kind {
        ThresholdKind::Expired => (
            format!(
                "🚨 License expired: {} (No. {})",
                license.license_type, license.license_number
            ),
            format!(
                "Your {} license requires immediate attention: it {phrase}.",
                license.license_type
            ),
            "Please renew it immediately and update your records.",
        ),
        ThresholdKind::SevenDay => (
            format!(
                "⚠️ Final reminder: {} license expires soon",
                license.license_type
            ),
            format!(
                "This is your final reminder: your {} license {phrase}.",
                license.license_type
            ),
            "Please complete your renewal as soon as possible.",
        ),
        ThresholdKind::ThirtyDay => (
            format!("📋 Upcoming renewal: {} license", license.license_type),
            format!(
                "A heads-up that your {} license {phrase}.",
                license.license_type
            ),
            "Please plan your renewal ahead of the expiry date.",
        ),
    };

    let body = format!(
        "Hello {},\n\n{}\n\n  License type:   {}\n  License number: {}\n  Expiry date:    {}\n\n{}\n",
        license.employee_name, framing, license.license_type, license.license_number, expiry, closing,
    );

    ReminderNotice {
        recipient: license.employee_email.clone(),
        subject,
        body,
        metadata: NoticeMetadata {
            employee_name: license.employee_name.clone(),
            license_type: license.license_type.clone(),
            license_number: license.license_number.clone(),
            expiry_date: license.expiry_date,
            days_until_expiry: days_remaining,
            threshold: kind,
        },
    }
}

/// Boundary cases get their own phrasing instead of a bare N substitution.
fn day_phrase(days_remaining: i64) -> String {
    match days_remaining {
        0 => "expires today".into(),
        1 => "expires tomorrow".into(),
        d if d > 1 => format!("expires in {d} days"),
        -1 => "expired 1 day ago".into(),
        d => format!("expired {} days ago", -d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn license() -> LicenseRecord {
        LicenseRecord {
            id: "l1".into(),
            employee_id: "e1".into(),
            license_type: "Registered Nurse".into(),
            license_number: "RN-4471".into(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 4, 4).unwrap(),
            issue_date: None,
            employee_name: "Dana Reyes".into(),
            employee_email: "dana@example.com".into(),
        }
    }

    #[test]
    fn test_day_phrase_boundaries() {
        assert_eq!(day_phrase(0), "expires today");
        assert_eq!(day_phrase(1), "expires tomorrow");
        assert_eq!(day_phrase(25), "expires in 25 days");
        assert_eq!(day_phrase(-1), "expired 1 day ago");
        assert_eq!(day_phrase(-3), "expired 3 days ago");
    }

    #[test]
    fn test_thirty_day_notice_is_informational() {
        let notice = render(&license(), ThresholdKind::ThirtyDay, 25);
        assert!(notice.subject.contains("Upcoming renewal"));
        assert!(notice.body.contains("expires in 25 days"));
        assert!(notice.body.contains("Dana Reyes"));
        assert!(notice.body.contains("RN-4471"));
        assert!(notice.body.contains("04 Apr 2026"));
        assert_eq!(notice.recipient, "dana@example.com");
        assert_eq!(notice.metadata.days_until_expiry, 25);
    }

    #[test]
    fn test_seven_day_notice_is_final_reminder() {
        let notice = render(&license(), ThresholdKind::SevenDay, 5);
        assert!(notice.subject.contains("Final reminder"));
        assert!(notice.body.contains("final reminder"));
        assert!(notice.body.contains("expires in 5 days"));
    }

    #[test]
    fn test_expired_notice_uses_expired_language() {
        let notice = render(&license(), ThresholdKind::Expired, -3);
        assert!(notice.subject.contains("License expired"));
        assert!(notice.body.contains("expired 3 days ago"));
        assert!(notice.body.contains("immediate attention"));
    }

    #[test]
    fn test_expires_today_never_says_zero_days() {
        let notice = render(&license(), ThresholdKind::SevenDay, 0);
        assert!(notice.body.contains("expires today"));
        assert!(!notice.body.contains("0 days"));
    }
}
