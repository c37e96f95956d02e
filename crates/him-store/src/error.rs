use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No platform data directory to keep the session file in.
    #[error("Could not determine a data directory for the admin session")]
    NoDataDir,

    #[error("Could not create the session storage directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage migration v{version:03} failed: {reason}")]
    Migration { version: u32, reason: String },

    /// The file was written by a newer console build.
    #[error("Session storage schema v{found} is newer than supported v{supported}")]
    SchemaTooNew { found: u32, supported: u32 },

    /// A session value (the stored user) could not be encoded or decoded.
    #[error("Session value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
