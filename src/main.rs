//! scopus-harvester - Scopus institutional publication harvester
//!
//! ## Usage
//!
//! ### Connectivity check
//! ```bash
//! scopus-harvester check
//! ```
//!
//! ### Harvest
//! ```bash
//! scopus-harvester harvest --start-year 2024 --end-year 2025 --max-items 5000
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use scopus_harvester::config::{Config, DEFAULT_INSTITUTION_ID};
use scopus_harvester::models::SearchQuery;
use scopus_harvester::pipeline;
use scopus_harvester::scopus::{ConnectionStatus, ScopusClient, StopReason};
use scopus_harvester::HarvestError;
use std::path::PathBuf;
use tracing::{error, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Scopus institutional publication harvester
#[derive(Parser)]
#[command(name = "scopus-harvester")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue one COMPLETE-view request and report whether access is granted
    Check {
        /// Scopus affiliation id used in the test query
        #[arg(long, default_value = DEFAULT_INSTITUTION_ID)]
        institution_id: String,
    },

    /// Fetch the institution's documents for a year range and write CSV/JSON reports
    Harvest {
        /// First publication year (inclusive)
        #[arg(long, default_value = "2024")]
        start_year: i32,

        /// Last publication year (inclusive)
        #[arg(long, default_value = "2025")]
        end_year: i32,

        /// Maximum number of documents to fetch
        #[arg(long, default_value = "5000")]
        max_items: usize,

        /// Scopus advanced search query (default: AF-ID(<institution-id>))
        #[arg(long)]
        query: Option<String>,

        /// Scopus affiliation id of the institution
        #[arg(long, default_value = DEFAULT_INSTITUTION_ID)]
        institution_id: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Report file name prefix
        #[arg(long, default_value = "scopus_unb_autores")]
        prefix: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Check { institution_id } => run_check(institution_id).await,
        Commands::Harvest {
            start_year,
            end_year,
            max_items,
            query,
            institution_id,
            output,
            prefix,
        } => {
            run_harvest(
                start_year,
                end_year,
                max_items,
                query,
                institution_id,
                output,
                prefix,
            )
            .await
        }
    }
}

// ============================================================================
// Connectivity Check
// ============================================================================

async fn run_check(institution_id: String) -> Result<()> {
    println!("--- Connection test: Scopus COMPLETE view ---");

    let config = Config::from_env()
        .context("Failed to load configuration")?
        .with_institution(institution_id);
    let client = ScopusClient::new(config)?;

    match client.check_connection().await {
        Ok(ConnectionStatus::Granted { status }) => {
            println!("\n✓ Access granted: the network is entitled to view=COMPLETE.");
            println!("You can now run 'scopus-harvester harvest' to collect author ids.");
            println!("Status: {}", status);
        }
        Ok(ConnectionStatus::Denied) => {
            println!("\n⛔ Access denied (401).");
            println!(
                "Diagnosis: the key needs an institutional token, or the VPN is not tunnelling the traffic."
            );
        }
        Ok(ConnectionStatus::Unexpected { status }) => {
            println!("\n⚠ Unexpected result: {}", status);
        }
        Err(e) => {
            error!(error = %e, "Connection check failed");
            println!("Connection error: {}", e);
        }
    }

    Ok(())
}

// ============================================================================
// Harvest Pipeline
// ============================================================================

async fn run_harvest(
    start_year: i32,
    end_year: i32,
    max_items: usize,
    query: Option<String>,
    institution_id: String,
    output_dir: PathBuf,
    prefix: String,
) -> Result<()> {
    let config = Config::from_env()
        .context("Failed to load configuration")?
        .with_institution(institution_id);
    let query = query.unwrap_or_else(|| config.institution_query());

    let search = SearchQuery::new(query, start_year, end_year, max_items)
        .context("Invalid search parameters")?;
    let client = ScopusClient::new(config)?;

    println!(
        "--- Searching {} between {} and {} ---",
        search.query(),
        search.start_year(),
        search.end_year()
    );

    let outcome = pipeline::harvest_to_reports(
        &client,
        &search,
        &output_dir,
        &prefix,
        &Local::now(),
        |fetched| println!("   -> Downloaded {} documents...", fetched),
    )
    .await
    .context("Failed to write reports")?;

    match &outcome.stop {
        StopReason::LimitReached | StopReason::Exhausted => {}
        StopReason::Failed(HarvestError::Unauthorized) => {
            println!("⛔ ERROR 401: permission failure (view=COMPLETE). Check the VPN.");
        }
        StopReason::Failed(HarvestError::Api { code, message }) => {
            println!("⚠ Error: {} - {}", code, message);
        }
        StopReason::Failed(e) => {
            println!("❌ Critical error: {}", e);
        }
    }

    match outcome.reports {
        None => println!("No data found for this period."),
        Some(paths) => {
            println!(
                "\n✓ Done! {} documents ({} with institutional authors), 2 files written:",
                outcome.documents, outcome.with_institutional_ids
            );
            println!("   CSV:  {}", paths.csv.display());
            println!("   JSON: {}", paths.json.display());
        }
    }

    Ok(())
}
