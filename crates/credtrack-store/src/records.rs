//! Read-only SQLite view over the dashboard's employee and license rows.
//!
//! The dashboard owns these tables; the engine only ever reads them. The
//! schema bootstrap and insert helpers below exist for tests and for seeding
//! a fresh install — the scan path never writes here.

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

use credtrack_core::error::{CredTrackError, Result};
use credtrack_core::traits::RecordsSource;
use credtrack_core::types::LicenseRecord;

const DATE_FMT: &str = "%Y-%m-%d";

pub struct SqliteRecords {
    conn: Mutex<Connection>,
}

impl SqliteRecords {
    /// Open or create the records database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| CredTrackError::Records(format!("DB open: {e}")))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS employees (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS licenses (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL,
                license_type TEXT NOT NULL,
                license_number TEXT NOT NULL,
                expiry_date TEXT,            -- ISO date, NULL = never expires
                issue_date TEXT,
                FOREIGN KEY (employee_id) REFERENCES employees(id)
            );",
        )
        .map_err(|e| CredTrackError::Records(format!("Migration: {e}")))?;
        Ok(())
    }

    /// Seed helper — used by tests and first-run setup, not by scans.
    pub fn insert_employee(&self, id: &str, name: &str, email: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO employees (id, name, email) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, name, email],
        )
        .map_err(|e| CredTrackError::Records(format!("Insert employee: {e}")))?;
        Ok(())
    }

    /// Seed helper — used by tests and first-run setup, not by scans.
    pub fn insert_license(
        &self,
        id: &str,
        employee_id: &str,
        license_type: &str,
        license_number: &str,
        expiry_date: Option<NaiveDate>,
        issue_date: Option<NaiveDate>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO licenses
             (id, employee_id, license_type, license_number, expiry_date, issue_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                id,
                employee_id,
                license_type,
                license_number,
                expiry_date.map(|d| d.format(DATE_FMT).to_string()),
                issue_date.map(|d| d.format(DATE_FMT).to_string()),
            ],
        )
        .map_err(|e| CredTrackError::Records(format!("Insert license: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl RecordsSource for SqliteRecords {
    async fn fetch_licenses(&self) -> Result<Vec<LicenseRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT l.id, l.employee_id, l.license_type, l.license_number,
                        l.expiry_date, l.issue_date, e.name, e.email
                 FROM licenses l
                 JOIN employees e ON e.id = l.employee_id
                 WHERE l.expiry_date IS NOT NULL
                 ORDER BY l.expiry_date",
            )
            .map_err(|e| CredTrackError::Records(format!("Prepare: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let employee_id: String = row.get(1)?;
                let license_type: String = row.get(2)?;
                let license_number: String = row.get(3)?;
                let expiry_raw: String = row.get(4)?;
                let issue_raw: Option<String> = row.get(5)?;
                let employee_name: String = row.get(6)?;
                let employee_email: String = row.get(7)?;

                let expiry_date = NaiveDate::parse_from_str(&expiry_raw, DATE_FMT).ok();
                let issue_date =
                    issue_raw.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FMT).ok());

                Ok(expiry_date.map(|expiry_date| LicenseRecord {
                    id,
                    employee_id,
                    license_type,
                    license_number,
                    expiry_date,
                    issue_date,
                    employee_name,
                    employee_email,
                }))
            })
            .map_err(|e| CredTrackError::Records(format!("Query: {e}")))?;

        let mut licenses = Vec::new();
        for row in rows {
            match row.map_err(|e| CredTrackError::Records(format!("Row: {e}")))? {
                Some(license) => licenses.push(license),
                // Unparseable expiry dates are skipped, not fatal.
                None => tracing::warn!("⚠️ License row with malformed expiry date skipped"),
            }
        }
        Ok(licenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> (SqliteRecords, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join("records.db");
        std::fs::remove_file(&path).ok();
        (SqliteRecords::open(&path).unwrap(), dir)
    }

    #[tokio::test]
    async fn test_fetch_joins_employee_identity() {
        let (store, dir) = temp_store("credtrack-records-join");
        store
            .insert_employee("e1", "Dana Reyes", "dana@example.com")
            .unwrap();
        store
            .insert_license(
                "l1",
                "e1",
                "Registered Nurse",
                "RN-4471",
                NaiveDate::from_ymd_opt(2026, 9, 1),
                NaiveDate::from_ymd_opt(2024, 9, 1),
            )
            .unwrap();

        let licenses = store.fetch_licenses().await.unwrap();
        assert_eq!(licenses.len(), 1);
        assert_eq!(licenses[0].employee_name, "Dana Reyes");
        assert_eq!(licenses[0].employee_email, "dana@example.com");
        assert_eq!(
            licenses[0].expiry_date,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_null_expiry_rows_excluded() {
        let (store, dir) = temp_store("credtrack-records-null");
        store
            .insert_employee("e1", "Sam Okafor", "sam@example.com")
            .unwrap();
        store
            .insert_license("l1", "e1", "Forklift", "FL-1", None, None)
            .unwrap();
        store
            .insert_license(
                "l2",
                "e1",
                "First Aid",
                "FA-2",
                NaiveDate::from_ymd_opt(2026, 1, 15),
                None,
            )
            .unwrap();

        let licenses = store.fetch_licenses().await.unwrap();
        assert_eq!(licenses.len(), 1);
        assert_eq!(licenses[0].id, "l2");
        std::fs::remove_dir_all(&dir).ok();
    }
}
