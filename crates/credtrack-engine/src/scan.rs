//! The scan orchestrator — the engine's only "run" entry point.
//!
//! One pass walks every license record, detects pending thresholds, delivers
//! reminders, and records confirmed deliveries in the ledger. Overlapping
//! invocations are serialized by a scan mutex; on top of that every ledger
//! write is a per-key compare-and-set, so even a racing runner on another
//! process sharing the same ledger cannot double-charge a key.
//!
//! Failure semantics: a failed bulk fetch aborts the pass ({0, 0, 1}); a
//! failed delivery is counted and the ledger left untouched so the next pass
//! retries; a failed ledger write after a confirmed send is the one
//! at-least-once window — logged distinctly so operators can reconcile.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use credtrack_core::traits::{Notifier, RecordsSource, ReminderLedger};
use credtrack_core::types::ScanOutcome;

use crate::dispatch::ReminderDispatcher;
use crate::threshold::pending_threshold;

pub struct ScanOrchestrator {
    records: Arc<dyn RecordsSource>,
    ledger: Arc<dyn ReminderLedger>,
    dispatcher: ReminderDispatcher,
    scan_lock: Mutex<()>,
}

impl ScanOrchestrator {
    pub fn new(
        records: Arc<dyn RecordsSource>,
        ledger: Arc<dyn ReminderLedger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            records,
            ledger,
            dispatcher: ReminderDispatcher::new(notifier),
            scan_lock: Mutex::new(()),
        }
    }

    /// Run one full pass over all license records. Always returns the three
    /// aggregate counts — they are the sole observable result of a scan.
    pub async fn run_scan(&self, reference: DateTime<Utc>) -> ScanOutcome {
        let _guard = self.scan_lock.lock().await;
        let scan_id = uuid::Uuid::new_v4();
        tracing::info!(
            "🔍 Expiry scan {scan_id} started (channel: {})",
            self.dispatcher.channel_name()
        );

        let licenses = match self.records.fetch_licenses().await {
            Ok(licenses) => licenses,
            Err(e) => {
                tracing::error!("❌ Expiry scan {scan_id} aborted, could not load records: {e}");
                return ScanOutcome::aborted();
            }
        };

        let mut outcome = ScanOutcome::default();
        for license in &licenses {
            outcome.checked += 1;

            let kind = match pending_threshold(license, reference, self.ledger.as_ref()).await {
                Ok(Some(kind)) => kind,
                Ok(None) => continue,
                Err(e) => {
                    outcome.errors += 1;
                    tracing::warn!("⚠️ Ledger lookup failed for license {}: {e}", license.id);
                    continue;
                }
            };

            match self.dispatcher.send(license, kind, reference).await {
                Ok(()) => {
                    outcome.sent += 1;
                    match self
                        .ledger
                        .mark_sent(&license.id, license.expiry_date, kind)
                        .await
                    {
                        Ok(true) => {
                            tracing::info!(
                                "🔔 {kind} reminder sent for license {} ({})",
                                license.id,
                                license.employee_email
                            );
                        }
                        Ok(false) => {
                            // Another runner recorded this key between our
                            // lookup and mark — the send stands, entry exists.
                            tracing::debug!(
                                "Ledger entry for license {} {kind} already present",
                                license.id
                            );
                        }
                        Err(e) => {
                            // Delivery happened, the record of it did not.
                            // The next scan may redeliver this one key.
                            tracing::error!(
                                "🔥 Reminder for license {} ({kind}) was delivered but could not \
                                 be recorded in the ledger — next scan may redeliver: {e}",
                                license.id
                            );
                        }
                    }
                }
                Err(e) => {
                    outcome.errors += 1;
                    tracing::warn!(
                        "⚠️ Reminder delivery failed for license {} ({kind}): {e}",
                        license.id
                    );
                }
            }
        }

        tracing::info!(
            "✅ Expiry scan {scan_id} finished: {} checked, {} sent, {} errors",
            outcome.checked,
            outcome.sent,
            outcome.errors
        );
        outcome
    }
}

/// Drive recurring scans as a background tokio task. The first tick fires
/// immediately, which covers the run-at-startup trigger.
pub async fn spawn_scan_loop(orchestrator: Arc<ScanOrchestrator>, interval_secs: u64) {
    tracing::info!("⏰ Expiry scan loop started (every {interval_secs}s)");
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    loop {
        interval.tick().await;
        let outcome = orchestrator.run_scan(Utc::now()).await;
        if outcome.errors > 0 {
            tracing::warn!(
                "⚠️ Scheduled scan had {} error(s) ({} checked, {} sent)",
                outcome.errors,
                outcome.checked,
                outcome.sent
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use credtrack_core::error::{CredTrackError, Result};
    use credtrack_core::types::{LicenseRecord, ReminderNotice, ThresholdKind};
    use credtrack_store::MemoryLedger;
    use std::sync::Mutex as StdMutex;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap()
    }

    fn license(id: &str, expires_in_days: i64) -> LicenseRecord {
        license_at(id, reference(), expires_in_days)
    }

    fn license_at(id: &str, from: DateTime<Utc>, expires_in_days: i64) -> LicenseRecord {
        LicenseRecord {
            id: id.into(),
            employee_id: format!("emp-{id}"),
            license_type: "Registered Nurse".into(),
            license_number: format!("RN-{id}"),
            expiry_date: from.date_naive() + Duration::days(expires_in_days),
            issue_date: None,
            employee_name: "Dana Reyes".into(),
            employee_email: format!("{id}@example.com"),
        }
    }

    /// Fixed in-memory records source.
    struct StaticRecords {
        licenses: StdMutex<Vec<LicenseRecord>>,
    }

    impl StaticRecords {
        fn new(licenses: Vec<LicenseRecord>) -> Self {
            Self {
                licenses: StdMutex::new(licenses),
            }
        }

        fn replace(&self, licenses: Vec<LicenseRecord>) {
            *self.licenses.lock().unwrap() = licenses;
        }
    }

    #[async_trait]
    impl RecordsSource for StaticRecords {
        async fn fetch_licenses(&self) -> Result<Vec<LicenseRecord>> {
            Ok(self.licenses.lock().unwrap().clone())
        }
    }

    /// Records source whose bulk fetch always fails.
    struct FailingRecords;

    #[async_trait]
    impl RecordsSource for FailingRecords {
        async fn fetch_licenses(&self) -> Result<Vec<LicenseRecord>> {
            Err(CredTrackError::Records("connection refused".into()))
        }
    }

    /// Captures every delivered notice; deliveries for the listed license
    /// numbers fail with a channel error.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: StdMutex<Vec<ReminderNotice>>,
        fail_numbers: StdMutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn fail_for(&self, license_number: &str) {
            self.fail_numbers.lock().unwrap().push(license_number.into());
        }

        fn clear_failures(&self) {
            self.fail_numbers.lock().unwrap().clear();
        }

        fn delivered(&self) -> Vec<ReminderNotice> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, notice: &ReminderNotice) -> Result<()> {
            if self
                .fail_numbers
                .lock()
                .unwrap()
                .contains(&notice.metadata.license_number)
            {
                return Err(CredTrackError::Channel("smtp 550".into()));
            }
            self.sent.lock().unwrap().push(notice.clone());
            Ok(())
        }
    }

    struct Harness {
        records: Arc<StaticRecords>,
        ledger: Arc<MemoryLedger>,
        notifier: Arc<RecordingNotifier>,
        orchestrator: ScanOrchestrator,
    }

    fn harness(licenses: Vec<LicenseRecord>) -> Harness {
        let records = Arc::new(StaticRecords::new(licenses));
        let ledger = Arc::new(MemoryLedger::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let orchestrator = ScanOrchestrator::new(
            records.clone(),
            ledger.clone(),
            notifier.clone(),
        );
        Harness {
            records,
            ledger,
            notifier,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn test_rescan_is_idempotent() {
        // One license per band; Upcoming never fires.
        let h = harness(vec![
            license("a", 45),
            license("b", 20),
            license("c", 3),
            license("d", -2),
        ]);

        let first = h.orchestrator.run_scan(reference()).await;
        assert_eq!(
            first,
            ScanOutcome {
                checked: 4,
                sent: 3,
                errors: 0
            }
        );

        // Same reference time, no ledger reset: nothing new to send.
        let second = h.orchestrator.run_scan(reference()).await;
        assert_eq!(
            second,
            ScanOutcome {
                checked: 4,
                sent: 0,
                errors: 0
            }
        );
        assert_eq!(h.notifier.delivered().len(), 3);
    }

    #[tokio::test]
    async fn test_tighter_band_sends_once_never_repeats_earlier() {
        let h = harness(vec![license("a", 20)]);

        let first = h.orchestrator.run_scan(reference()).await;
        assert_eq!(first.sent, 1);

        // Two weeks later the license is in the urgent band.
        let later = reference() + Duration::days(15);
        let second = h.orchestrator.run_scan(later).await;
        assert_eq!(second.sent, 1);

        let delivered = h.notifier.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].metadata.threshold, ThresholdKind::ThirtyDay);
        assert_eq!(delivered[1].metadata.threshold, ThresholdKind::SevenDay);

        // A third pass at the same instant fires nothing.
        let third = h.orchestrator.run_scan(later).await;
        assert_eq!(third.sent, 0);
    }

    #[tokio::test]
    async fn test_skip_ahead_fires_expired_only() {
        let h = harness(vec![license("a", 40)]);

        // Upcoming: nothing pending.
        let first = h.orchestrator.run_scan(reference()).await;
        assert_eq!(first.sent, 0);

        // The scan never ran while the license crossed the thirty- and
        // seven-day windows. Only the band it is in now fires.
        let much_later = reference() + Duration::days(45);
        let second = h.orchestrator.run_scan(much_later).await;
        assert_eq!(second.sent, 1);

        let delivered = h.notifier.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].metadata.threshold, ThresholdKind::Expired);

        let expiry = h.records.licenses.lock().unwrap()[0].expiry_date;
        assert!(!h.ledger.has_sent("a", expiry, ThresholdKind::ThirtyDay).await.unwrap());
        assert!(!h.ledger.has_sent("a", expiry, ThresholdKind::SevenDay).await.unwrap());
        assert!(h.ledger.has_sent("a", expiry, ThresholdKind::Expired).await.unwrap());
    }

    #[tokio::test]
    async fn test_delivery_failure_is_isolated_and_retried() {
        let h = harness(vec![license("a", 5), license("b", 5), license("c", 5)]);
        h.notifier.fail_for("RN-b");

        let first = h.orchestrator.run_scan(reference()).await;
        assert_eq!(
            first,
            ScanOutcome {
                checked: 3,
                sent: 2,
                errors: 1
            }
        );
        // The failed key never reached the ledger.
        let expiry = reference().date_naive() + Duration::days(5);
        assert!(!h.ledger.has_sent("b", expiry, ThresholdKind::SevenDay).await.unwrap());

        // Channel recovers: the next pass retries exactly the failed key.
        h.notifier.clear_failures();
        let second = h.orchestrator.run_scan(reference()).await;
        assert_eq!(
            second,
            ScanOutcome {
                checked: 3,
                sent: 1,
                errors: 0
            }
        );
        assert!(h.ledger.has_sent("b", expiry, ThresholdKind::SevenDay).await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_with_single_error() {
        let orchestrator = ScanOrchestrator::new(
            Arc::new(FailingRecords),
            Arc::new(MemoryLedger::new()),
            Arc::new(RecordingNotifier::default()),
        );
        let outcome = orchestrator.run_scan(reference()).await;
        assert_eq!(
            outcome,
            ScanOutcome {
                checked: 0,
                sent: 0,
                errors: 1
            }
        );
    }

    #[tokio::test]
    async fn test_expired_notice_wording_and_same_day_rescan() {
        let h = harness(vec![license("a", -3)]);

        let first = h.orchestrator.run_scan(reference()).await;
        assert_eq!(first.sent, 1);
        let delivered = h.notifier.delivered();
        assert!(delivered[0].body.contains("expired 3 days ago"));
        assert!(delivered[0].subject.contains("License expired"));

        // Later the same day: no re-fire.
        let same_day = reference() + Duration::hours(6);
        let second = h.orchestrator.run_scan(same_day).await;
        assert_eq!(second.sent, 0);
    }

    #[tokio::test]
    async fn test_expires_today_wording() {
        let h = harness(vec![license("a", 0)]);
        let outcome = h.orchestrator.run_scan(reference()).await;
        assert_eq!(outcome.sent, 1);
        let delivered = h.notifier.delivered();
        assert_eq!(delivered[0].metadata.threshold, ThresholdKind::SevenDay);
        assert!(delivered[0].body.contains("expires today"));
        assert!(!delivered[0].body.contains("0 days"));
    }

    #[tokio::test]
    async fn test_renewal_opens_a_fresh_cycle() {
        let h = harness(vec![license("a", -1)]);

        let first = h.orchestrator.run_scan(reference()).await;
        assert_eq!(first.sent, 1);

        // The employee renews: same license row, new expiry date.
        h.records.replace(vec![license("a", 60)]);
        let second = h.orchestrator.run_scan(reference()).await;
        assert_eq!(second.sent, 0); // Upcoming — nothing pending yet.

        // 35 days on, the renewed license enters the warning band and the
        // old cycle's entries do not suppress the new cycle.
        let later = reference() + Duration::days(35);
        let third = h.orchestrator.run_scan(later).await;
        assert_eq!(third.sent, 1);
        let delivered = h.notifier.delivered();
        assert_eq!(delivered[1].metadata.threshold, ThresholdKind::ThirtyDay);
    }

    #[tokio::test]
    async fn test_concurrent_scans_deliver_once() {
        let h = harness(vec![license("a", 3)]);
        let orchestrator = Arc::new(h.orchestrator);

        let (one, two) = tokio::join!(
            orchestrator.run_scan(reference()),
            orchestrator.run_scan(reference())
        );
        // Scans serialize on the scan mutex: exactly one of them sends.
        assert_eq!(one.sent + two.sent, 1);
        assert_eq!(h.notifier.delivered().len(), 1);
    }
}
