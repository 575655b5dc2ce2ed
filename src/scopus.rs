//! Scopus Search API client.
//!
//! Pages through search results for an institution and a publication-year
//! range. Requests always ask for `view=COMPLETE`, the only view that carries
//! per-author affiliation ids.
//!
//! API notes:
//! - COMPLETE view is capped at 25 entries per page
//! - Requests without an institutional entitlement are answered with 401
//! - Nothing is retried; a failed page ends the run with what was already fetched

use crate::config::Config;
use crate::error::{HarvestError, Result};
use crate::models::{value_to_string, DocumentRecord, SearchQuery, SearchResponse};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, warn};

/// Header carrying the Elsevier API key
const API_KEY_HEADER: &str = "X-ELS-APIKey";

/// Most detailed response tier
const VIEW_COMPLETE: &str = "COMPLETE";

/// One page of search results.
#[derive(Debug, Default)]
pub struct SearchPage {
    /// `opensearch:totalResults`, when Scopus reports it
    pub total_results: Option<u64>,
    pub entries: Vec<DocumentRecord>,
}

/// Why the pagination loop ended.
#[derive(Debug)]
pub enum StopReason {
    /// The requested number of documents was reached
    LimitReached,
    /// A page came back with no entries
    Exhausted,
    /// A request failed; documents fetched before it are kept
    Failed(HarvestError),
}

/// Outcome of a paginated search.
#[derive(Debug)]
pub struct Harvest {
    pub documents: Vec<DocumentRecord>,
    pub stop: StopReason,
}

/// Result of the connectivity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// COMPLETE view is available
    Granted { status: u16 },
    /// 401: the key is not entitled from this network
    Denied,
    /// Any other status
    Unexpected { status: u16 },
}

/// Scopus Search API client
pub struct ScopusClient {
    client: Client,
    config: Config,
}

impl ScopusClient {
    /// Create a client that sends the configured API key on every request.
    pub fn new(config: Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| HarvestError::Config(format!("Invalid API key header: {}", e)))?;
        headers.insert(API_KEY_HEADER, key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("scopus-harvester/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HarvestError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Issue a single COMPLETE-view request for the institution and report
    /// whether access was granted. Transport failures are returned as errors.
    pub async fn check_connection(&self) -> Result<ConnectionStatus> {
        let query = self.config.institution_query();
        info!(query = %query, "Checking Scopus COMPLETE view access");

        let response = self.send_search(&query, None, None, 1).await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Connection check response");

        Ok(match status {
            StatusCode::OK => ConnectionStatus::Granted {
                status: status.as_u16(),
            },
            StatusCode::UNAUTHORIZED => ConnectionStatus::Denied,
            other => ConnectionStatus::Unexpected {
                status: other.as_u16(),
            },
        })
    }

    /// Fetch one page of results.
    ///
    /// # Errors
    ///
    /// `Unauthorized` on 401, `Api` on any other non-200 status, `Network`
    /// or `Json` when the request or the body fails.
    pub async fn fetch_page(
        &self,
        query: &str,
        date: Option<&str>,
        start: Option<usize>,
        count: usize,
    ) -> Result<SearchPage> {
        let response = self.send_search(query, date, start, count).await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(HarvestError::Unauthorized);
        }

        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), error = %message, "Scopus API error");
            return Err(HarvestError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        parse_search_page(&body)
    }

    /// Page through the results of `search` until the item limit is reached,
    /// a page comes back empty, or a request fails.
    ///
    /// `on_page` is called with the running document count after each page.
    /// Never returns an error: a failure is recorded in [`Harvest::stop`] and the
    /// documents fetched before it are returned alongside.
    pub async fn search_by_period(
        &self,
        search: &SearchQuery,
        mut on_page: impl FnMut(usize),
    ) -> Harvest {
        let date = search.date_range();
        let page_size = self.config.page_size as usize;
        let max_items = search.max_items();

        info!(
            query = search.query(),
            date = %date,
            max_items = max_items,
            "Starting Scopus search"
        );

        let mut documents: Vec<DocumentRecord> = Vec::new();
        let mut start = 0usize;

        let stop = loop {
            let count = page_size.min(max_items.saturating_sub(documents.len()));
            if count == 0 {
                break StopReason::LimitReached;
            }

            debug!(start = start, count = count, "Fetching Scopus page");

            let page = match self
                .fetch_page(search.query(), Some(date.as_str()), Some(start), count)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(start = start, error = %e, "Stopping search");
                    break StopReason::Failed(e);
                }
            };

            if start == 0 {
                if let Some(total) = page.total_results {
                    info!(total_results = total, "Scopus reported result count");
                }
            }

            if page.entries.is_empty() {
                break StopReason::Exhausted;
            }

            documents.extend(page.entries);
            info!(fetched = documents.len(), "Page fetched");
            on_page(documents.len());

            tokio::time::sleep(self.config.request_delay).await;
            start += page_size;
        };

        info!(total = documents.len(), stop = ?stop, "Scopus search complete");
        Harvest { documents, stop }
    }

    async fn send_search(
        &self,
        query: &str,
        date: Option<&str>,
        start: Option<usize>,
        count: usize,
    ) -> Result<Response> {
        let mut params: Vec<(&str, String)> = vec![("query", query.to_string())];
        if let Some(date) = date {
            params.push(("date", date.to_string()));
        }
        params.push(("count", count.to_string()));
        if let Some(start) = start {
            params.push(("start", start.to_string()));
        }
        params.push(("view", VIEW_COMPLETE.to_string()));

        let response = self
            .client
            .get(self.config.base_url.clone())
            .query(&params)
            .send()
            .await?;

        Ok(response)
    }
}

/// Parse a search response body, dropping the placeholder entry Scopus
/// returns for an empty result set.
fn parse_search_page(body: &str) -> Result<SearchPage> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let Some(results) = response.search_results else {
        return Ok(SearchPage::default());
    };

    let total_results = results
        .total_results
        .as_ref()
        .and_then(value_to_string)
        .and_then(|t| t.parse().ok());

    let entries = results
        .entry
        .into_iter()
        .filter(|e| !e.is_error_marker())
        .collect();

    Ok(SearchPage {
        total_results,
        entries,
    })
}
