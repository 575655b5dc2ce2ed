//! Runtime configuration for the Scopus client.
//!
//! The API key is the only secret; it is read once at startup from the
//! environment (or a `.env` file) and handed to [`crate::scopus::ScopusClient`]
//! as part of an explicit [`Config`] value.

use crate::error::{HarvestError, Result};
use std::time::Duration;
use url::Url;

/// Scopus Search API endpoint
pub const SCOPUS_SEARCH_URL: &str = "https://api.elsevier.com/content/search/scopus";

/// Scopus affiliation id of Universidade de Brasília
pub const DEFAULT_INSTITUTION_ID: &str = "60024989";

/// Environment variable holding the Elsevier API key
pub const API_KEY_ENV: &str = "SCOPUS_API_KEY";

/// Maximum entries Scopus returns per page with view=COMPLETE
pub const PAGE_SIZE: u32 = 25;

/// Pause after each successful page to stay under the API quota
pub const REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Elsevier API key, sent as `X-ELS-APIKey`
    pub api_key: String,
    /// Search endpoint
    pub base_url: Url,
    /// Affiliation id used to pick out institutional authors
    pub institution_id: String,
    /// Entries requested per page
    pub page_size: u32,
    /// Delay after each successful page
    pub request_delay: Duration,
}

impl Config {
    /// Configuration with the production endpoint and default institution.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(HarvestError::Config(format!("{} is empty", API_KEY_ENV)));
        }

        Ok(Self {
            api_key,
            base_url: parse_base_url(SCOPUS_SEARCH_URL)?,
            institution_id: DEFAULT_INSTITUTION_ID.to_string(),
            page_size: PAGE_SIZE,
            request_delay: REQUEST_DELAY,
        })
    }

    /// Load the API key from `SCOPUS_API_KEY`, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read .env"),
        }

        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| HarvestError::Config(format!("{} is not set", API_KEY_ENV)))?;
        Self::new(api_key)
    }

    /// Configuration pointing at a mock server, with no inter-page delay.
    pub fn for_testing(base_url: &str) -> Result<Self> {
        Ok(Self {
            api_key: "test-key".to_string(),
            base_url: parse_base_url(base_url)?,
            institution_id: DEFAULT_INSTITUTION_ID.to_string(),
            page_size: PAGE_SIZE,
            request_delay: Duration::ZERO,
        })
    }

    /// Override the target institution.
    pub fn with_institution(mut self, institution_id: impl Into<String>) -> Self {
        self.institution_id = institution_id.into();
        self
    }

    /// Default query: every document affiliated with the configured institution.
    pub fn institution_query(&self) -> String {
        format!("AF-ID({})", self.institution_id)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| HarvestError::Config(format!("Invalid base URL {}: {}", raw, e)))
}
