use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database error: {0}")]
    DatabaseTask(#[from] tokio_rusqlite::Error),

    /// The store file cannot be opened, locked, or parsed. Read callers
    /// treat this as "no data"; write callers propagate it.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("article not found")]
    NotFound,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("news API error: {0}")]
    NewsApi(String),

    #[error("completion API error: {0}")]
    CompletionApi(String),

    #[error("Gemini API error: {0}")]
    GeminiApi(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Why a restore attempt failed. Callers degrade to empty listings either
/// way, but the reasons are kept distinct for logging and tests.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("vault credentials unavailable")]
    MissingCredentials,

    #[error("no backup blob found in the vault")]
    NoBackup,

    #[error("backup transfer failed: {0}")]
    Transfer(String),
}

/// Why a backup attempt failed. Never surfaces past the backup procedure,
/// which logs it and leaves the previous blob generation in place.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("vault credentials unavailable")]
    MissingCredentials,

    #[error("backup upload failed: {0}")]
    Upload(String),
}
