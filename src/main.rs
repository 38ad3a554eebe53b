//! # BP Sentiment
//!
//! Scrapes archived Baseball Prospectus articles by numeric id, extracts their
//! header metadata and body text, optionally scores the bodies with Stanford
//! CoreNLP's sentiment annotator, and summarizes each run as a CSV file.
//!
//! ## Usage
//!
//! ```sh
//! bp_sentiment --mode all-metadata --start 9901 --end 12658 --persist-bodies
//! bp_sentiment --mode sentiment --start 9901 --end 12658
//! ```
//!
//! ## Architecture
//!
//! One id at a time, in ascending order:
//! 1. **Fetching**: Download the print page (`all-metadata` only)
//! 2. **Extraction**: Pull date, title, author and body text out of the page
//! 3. **Storage**: Keep the body under `ScrapedFiles/` for later runs
//! 4. **Scoring**: Run CoreNLP over a stored body (`sentiment` only)
//! 5. **Output**: Write the mode's summary CSV once the range is done

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod sentiment;
mod store;
mod utils;

use cli::Cli;
use config::RunConfig;
use outputs::csv::SummaryOutcome;
use pipeline::Pipeline;
use scrapers::archive::PrintArchive;
use sentiment::annotator::CoreNlp;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("bp_sentiment starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match RunConfig::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        mode = %config.mode,
        start = %config.start,
        end = %config.end,
        persist_bodies = config.persist_bodies,
        root_dir = %config.root_dir.display(),
        "Loaded configuration"
    );

    let source = PrintArchive::new(config.url_template.clone());
    let annotator = CoreNlp::new(&config.annotator);
    let pipeline = Pipeline::new(&config, source, annotator);

    let outcome = pipeline.run().await?;
    let summary = pipeline
        .store()
        .summary_path(config.mode, config.start, config.end);
    match outcome {
        SummaryOutcome::Written { rows } => {
            info!(path = %summary.display(), rows, "Summary written")
        }
        SummaryOutcome::Skipped => {
            info!(path = %summary.display(), "Summary already present; nothing written")
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
