//! Error types for scopus-harvester.
//!
//! Every fallible library function returns `Result<T, HarvestError>`.

use thiserror::Error;

/// Main error type for harvesting operations.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// HTTP 401 from Scopus: the key lacks the COMPLETE view entitlement
    /// or the request did not originate from the institutional network.
    #[error("Unauthorized (401): API key not entitled to view=COMPLETE from this network")]
    Unauthorized,

    /// Scopus returned a non-success status other than 401
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Response body
        message: String,
    },

    /// Network/HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl HarvestError {
    /// True for the permission failure that callers report with a dedicated diagnostic.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HarvestError::Unauthorized)
    }
}

/// Result type alias using `HarvestError`
pub type Result<T> = std::result::Result<T, HarvestError>;
