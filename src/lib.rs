//! # scopus-harvester
//!
//! Harvests an institution's Scopus publications for a year range and writes
//! CSV/JSON reports listing which authors belong to the institution.
//!
//! ## Modules
//!
//! - [`scopus`] - Scopus Search API client (pagination, connectivity check)
//! - [`authors`] - Institutional author extraction
//! - [`report`] - CSV and JSON report writers
//! - [`pipeline`] - Fetch, extract and save in one run
//! - [`models`] - Search query, raw records and report rows
//! - [`config`] - API key and endpoint configuration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scopus_harvester::{config::Config, models::SearchQuery, pipeline, scopus::ScopusClient};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ScopusClient::new(Config::from_env()?)?;
//!     let search = SearchQuery::new("AF-ID(60024989)", 2024, 2025, 100)?;
//!
//!     let outcome = pipeline::harvest_to_reports(
//!         &client,
//!         &search,
//!         std::path::Path::new("."),
//!         "scopus_unb_autores",
//!         &chrono::Local::now(),
//!         |fetched| println!("{} documents", fetched),
//!     )
//!     .await?;
//!     println!("Reports: {:?}", outcome.reports);
//!     Ok(())
//! }
//! ```
//!
//! ## Report columns
//!
//! Both reports use the column names of the existing UnB/SciVal spreadsheets:
//! `titulo`, `ano`, `autores_unb_detalhado`, `autores_unb_ids`, `todos_autores`,
//! `revista`, `citacoes`, `doi`, `link`. See [`models::FlattenedRecord`].

pub mod authors;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scopus;

pub use error::{HarvestError, Result};
