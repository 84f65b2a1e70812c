//! CredTrack error type.

/// Errors produced by the reminder engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum CredTrackError {
    /// Configuration could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// The records store could not be queried.
    #[error("Records error: {0}")]
    Records(String),

    /// The reminder ledger could not be read or written.
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// A notification channel rejected or failed a delivery.
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CredTrackError>;
