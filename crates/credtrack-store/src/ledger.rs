//! The reminder ledger — which (license, cycle, threshold) reminders have
//! already been delivered.
//!
//! `mark_sent` is a per-key compare-and-set (`INSERT OR IGNORE` on the
//! primary key): of two racing callers exactly one sees `true`, and a repeat
//! call for an existing key is a no-op rather than an error. Entries are
//! never deleted here — a renewed license gets a new `cycle` key instead.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use credtrack_core::error::{CredTrackError, Result};
use credtrack_core::traits::ReminderLedger;
use credtrack_core::types::ThresholdKind;

const DATE_FMT: &str = "%Y-%m-%d";

/// SQLite-backed ledger. Durable across restarts and shared across scan
/// runners pointed at the same database file.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Open or create the ledger database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| CredTrackError::Ledger(format!("DB open: {e}")))?;
        let ledger = Self {
            conn: Mutex::new(conn),
        };
        ledger.migrate()?;
        Ok(ledger)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reminder_ledger (
                license_id TEXT NOT NULL,
                cycle TEXT NOT NULL,          -- expiry date at send time
                threshold TEXT NOT NULL,      -- 'thirty_day', 'seven_day', 'expired'
                sent_at TEXT NOT NULL,
                PRIMARY KEY (license_id, cycle, threshold)
            );",
        )
        .map_err(|e| CredTrackError::Ledger(format!("Migration: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ReminderLedger for SqliteLedger {
    async fn has_sent(
        &self,
        license_id: &str,
        cycle: NaiveDate,
        kind: ThresholdKind,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM reminder_ledger
                WHERE license_id = ?1 AND cycle = ?2 AND threshold = ?3
             )",
            rusqlite::params![license_id, cycle.format(DATE_FMT).to_string(), kind.as_str()],
            |row| row.get::<_, bool>(0),
        )
        .map_err(|e| CredTrackError::Ledger(format!("Lookup: {e}")))
    }

    async fn mark_sent(
        &self,
        license_id: &str,
        cycle: NaiveDate,
        kind: ThresholdKind,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO reminder_ledger
                 (license_id, cycle, threshold, sent_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    license_id,
                    cycle.format(DATE_FMT).to_string(),
                    kind.as_str(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| CredTrackError::Ledger(format!("Mark sent: {e}")))?;
        Ok(inserted > 0)
    }
}

/// In-memory ledger for tests and ephemeral setups. Same CAS semantics as
/// the SQLite backend, no durability.
#[derive(Default)]
pub struct MemoryLedger {
    entries: Mutex<HashSet<(String, NaiveDate, ThresholdKind)>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderLedger for MemoryLedger {
    async fn has_sent(
        &self,
        license_id: &str,
        cycle: NaiveDate,
        kind: ThresholdKind,
    ) -> Result<bool> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.contains(&(license_id.to_string(), cycle, kind)))
    }

    async fn mark_sent(
        &self,
        license_id: &str,
        cycle: NaiveDate,
        kind: ThresholdKind,
    ) -> Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        Ok(entries.insert((license_id.to_string(), cycle, kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
    }

    #[tokio::test]
    async fn test_mark_sent_is_compare_and_set() {
        let dir = std::env::temp_dir().join("credtrack-ledger-cas");
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join("ledger.db");
        std::fs::remove_file(&path).ok();
        let ledger = SqliteLedger::open(&path).unwrap();

        assert!(!ledger.has_sent("l1", cycle(), ThresholdKind::SevenDay).await.unwrap());
        // First caller wins the insert, second is a no-op, never an error.
        assert!(ledger.mark_sent("l1", cycle(), ThresholdKind::SevenDay).await.unwrap());
        assert!(!ledger.mark_sent("l1", cycle(), ThresholdKind::SevenDay).await.unwrap());
        assert!(ledger.has_sent("l1", cycle(), ThresholdKind::SevenDay).await.unwrap());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_keys_are_independent_per_threshold_and_cycle() {
        let ledger = MemoryLedger::new();
        let renewed = NaiveDate::from_ymd_opt(2027, 6, 30).unwrap();

        assert!(ledger.mark_sent("l1", cycle(), ThresholdKind::ThirtyDay).await.unwrap());
        // Same license, different threshold: independent key.
        assert!(!ledger.has_sent("l1", cycle(), ThresholdKind::SevenDay).await.unwrap());
        // Same license + threshold, renewed expiry date: fresh cycle.
        assert!(!ledger.has_sent("l1", renewed, ThresholdKind::ThirtyDay).await.unwrap());
        // Different license entirely.
        assert!(!ledger.has_sent("l2", cycle(), ThresholdKind::ThirtyDay).await.unwrap());
    }

    #[tokio::test]
    async fn test_sqlite_ledger_survives_reopen() {
        let dir = std::env::temp_dir().join("credtrack-ledger-reopen");
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join("ledger.db");
        std::fs::remove_file(&path).ok();

        {
            let ledger = SqliteLedger::open(&path).unwrap();
            ledger.mark_sent("l1", cycle(), ThresholdKind::Expired).await.unwrap();
        }
        let reopened = SqliteLedger::open(&path).unwrap();
        assert!(reopened.has_sent("l1", cycle(), ThresholdKind::Expired).await.unwrap());
        std::fs::remove_dir_all(&dir).ok();
    }
}
