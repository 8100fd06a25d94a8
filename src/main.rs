//! # Universal Beat
//!
//! A health and science news aggregator that pulls RSS/Atom feeds from
//! public-health agencies, journals and preprint servers, normalizes and
//! deduplicates the entries, and publishes them as a static site.
//!
//! ## Features
//!
//! - Query-driven Google News and PubMed feeds in front of a static feed list
//! - Fingerprint deduplication (link host + normalized title), first seen wins
//! - Best-effort `og:image` thumbnails under a per-run budget
//! - `data/items.json`, a month-paginated HTML archive with client-side search
//! - Optional directory catalog of programs, experts and institutions
//! - Optional webhook sinks receiving the newest items
//!
//! ## Usage
//!
//! ```sh
//! universal_beat --output-dir ./output --build-catalog --weekly-only
//! ```
//!
//! ## Architecture
//!
//! 1. **Aggregation**: fetch feeds in order, normalize, dedupe, enrich, sort
//! 2. **Output**: write JSON, the archive and the catalog placeholder
//! 3. **Catalog**: scrape the configured sites (when requested)
//! 4. **Publishing**: deliver the newest items to each configured sink

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};

mod catalog;
mod cli;
mod config;
mod dates;
mod error;
mod feeds;
mod fingerprint;
mod http;
mod logging;
mod models;
mod outputs;
mod pipeline;
mod publish;
mod thumbnail;
mod utils;

use cli::Cli;
use config::BeatConfig;
use http::HttpFetcher;
use outputs::{archive, json};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();

    // Parse CLI
    let args = Cli::parse();
    let data_dir = args.data_dir();

    // Early check: the data dir must be writable before any fetching
    ensure_writable_dir(&data_dir).await?;

    // --- Tracing init ---
    let log_path = logging::init(&data_dir)?;
    info!(log = %log_path.display(), "universal_beat starting up");
    debug!(?args, "Parsed CLI arguments");

    let config = BeatConfig::load(args.config.as_deref())?;
    let fetcher = HttpFetcher::new(&config.user_agent)?;

    json::write_nojekyll(&args.output_dir).await?;

    // ---- Aggregate ----
    let opts = args.aggregate_options();
    let items = pipeline::aggregate(&opts, &config.feeds, &fetcher, &fetcher).await;
    info!(count = items.len(), "Aggregated items");

    if let Err(e) = json::write_items(&items, &data_dir).await {
        error!(error = %e, "Failed to write items.json");
        return Err(e.into());
    }

    // ---- Archive ----
    let now = Utc::now();
    if args.no_archive {
        info!("Archive disabled");
    } else {
        let pages = archive::build_archive(&items, now);
        archive::write_archive(&pages, &args.archive_dir()).await?;
    }

    // ---- Catalog ----
    if args.should_build_catalog(now) {
        let built = catalog::build_catalog(&config.catalog_sites, &fetcher, &fetcher).await;
        if built.is_empty() {
            warn!("Catalog build produced no records");
        }
        json::write_catalog(&built, &data_dir).await?;
    } else if args.build_catalog {
        info!(
            weekday = %now.format("%a"),
            catalog_weekday = %args.catalog_weekday,
            "Skipping catalog build (weekly-only)"
        );
    }
    if json::ensure_catalog_placeholder(&data_dir).await? {
        info!("Wrote empty catalog placeholder");
    }
    if json::ensure_plan_placeholder(&data_dir).await? {
        info!("Wrote empty longevity plan placeholder");
    }

    // ---- Sinks ----
    let sinks = publish::webhook_sinks(&args.webhook_urls, fetcher.client());
    for report in publish::publish_items(&sinks, &items, args.publish_limit).await {
        if let Some(last_error) = &report.last_error {
            error!(sink = %report.sink, failed = report.failed, %last_error, "Sink had failures");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        query = %args.query,
        items = items.len(),
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
