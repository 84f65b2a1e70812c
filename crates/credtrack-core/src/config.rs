//! CredTrack configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CredTrackError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredTrackConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for CredTrackConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            scan: ScanConfig::default(),
            email: EmailConfig::default(),
            webhook: WebhookConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl CredTrackConfig {
    /// Load config from the default path (~/.credtrack/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CredTrackError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| CredTrackError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| CredTrackError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the CredTrack home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".credtrack")
    }
}

/// Storage paths for the records database and the reminder ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the dashboard's records database. Defaults to
    /// ~/.credtrack/records.db when unset.
    #[serde(default)]
    pub records_db: Option<PathBuf>,
    /// Path to the reminder ledger database. Defaults to
    /// ~/.credtrack/ledger.db when unset.
    #[serde(default)]
    pub ledger_db: Option<PathBuf>,
}

impl StoreConfig {
    pub fn records_path(&self) -> PathBuf {
        self.records_db
            .clone()
            .unwrap_or_else(|| CredTrackConfig::home_dir().join("records.db"))
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.ledger_db
            .clone()
            .unwrap_or_else(|| CredTrackConfig::home_dir().join("ledger.db"))
    }
}

/// Recurring scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Seconds between scan passes in serve mode.
    #[serde(default = "default_scan_interval")]
    pub interval_secs: u64,
}

fn default_scan_interval() -> u64 {
    3600
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_scan_interval(),
        }
    }
}

/// SMTP delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Sender address, also used as the SMTP username.
    #[serde(default)]
    pub from_address: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}
fn default_smtp_port() -> u16 {
    587
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            from_address: String::new(),
            password: String::new(),
            display_name: None,
        }
    }
}

/// Generic HTTP webhook delivery settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
    /// Optional bearer token sent in the Authorization header.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

/// HTTP trigger gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}
fn default_gateway_port() -> u16 {
    8520
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}
