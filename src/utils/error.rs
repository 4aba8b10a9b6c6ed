use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("unsupported input format: {detail}")]
    UnsupportedFormat { detail: String },

    #[error("invalid process number '{raw}': {reason}")]
    InvalidNumber { raw: String, reason: String },

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet processing error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("lookup failed: {message}")]
    LookupFailed { message: String },

    #[error("persistence failed: {message}")]
    PersistenceFailure { message: String },

    #[error("no pending item matches '{raw}'")]
    UnknownItem { raw: String },

    #[error("cannot leave step '{from}': {reason}")]
    StepRejected { from: &'static str, reason: String },

    #[error("missing configuration field: {field}")]
    MissingConfig { field: String },

    #[error("invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ImportError>;
