//! Fetch → Extract → Serialize for one harvesting run.
//!
//! Reports are only written when at least one document was fetched, including
//! the documents gathered before a failed page.

use crate::error::Result;
use crate::models::SearchQuery;
use crate::report::{self, ReportPaths};
use crate::scopus::{ScopusClient, StopReason};
use chrono::{DateTime, Local};
use std::path::Path;
use tracing::info;

/// Summary of a harvesting run.
#[derive(Debug)]
pub struct HarvestOutcome {
    /// Why pagination ended
    pub stop: StopReason,
    /// Documents fetched
    pub documents: usize,
    /// Documents with at least one institutional author id
    pub with_institutional_ids: usize,
    /// Written reports; `None` when nothing was fetched
    pub reports: Option<ReportPaths>,
}

/// Run a search and save the CSV/JSON reports into `output_dir`.
///
/// # Errors
///
/// Only report writing fails the run. Fetch failures end up in
/// [`HarvestOutcome::stop`].
pub async fn harvest_to_reports(
    client: &ScopusClient,
    search: &SearchQuery,
    output_dir: &Path,
    prefix: &str,
    now: &DateTime<Local>,
    on_page: impl FnMut(usize),
) -> Result<HarvestOutcome> {
    let harvest = client.search_by_period(search, on_page).await;
    let documents = harvest.documents.len();

    if documents == 0 {
        info!(stop = ?harvest.stop, "No documents fetched, skipping reports");
        return Ok(HarvestOutcome {
            stop: harvest.stop,
            documents,
            with_institutional_ids: 0,
            reports: None,
        });
    }

    let records = report::flatten_all(&harvest.documents, &client.config().institution_id);
    let with_institutional_ids = records
        .iter()
        .filter(|r| !r.affiliated_author_ids.is_empty())
        .count();
    info!(
        documents = documents,
        with_institutional_ids = with_institutional_ids,
        "Flattened documents"
    );

    let paths = report::save_reports(output_dir, prefix, &records, now)?;

    Ok(HarvestOutcome {
        stop: harvest.stop,
        documents,
        with_institutional_ids,
        reports: Some(paths),
    })
}
