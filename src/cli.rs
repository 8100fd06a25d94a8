//! Command-line interface definitions for Universal Beat.
//!
//! Every tuning option can also be provided through an environment variable.

use chrono::{DateTime, Datelike, Utc, Weekday};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::AggregateOptions;

pub const DEFAULT_QUERY: &str = "longevity OR aging OR chronic disease treatment OR randomized trial";

/// Command-line arguments for the Universal Beat aggregator.
///
/// # Examples
///
/// ```sh
/// # Default run into ./output
/// universal_beat
///
/// # Custom query and a weekly catalog refresh on Sundays
/// universal_beat --query "metformin" --build-catalog --weekly-only --catalog-weekday sun
///
/// # Forward the newest items to two webhooks
/// universal_beat --webhook-url https://a.example/hook,https://b.example/hook
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search expression for the Google News and PubMed feeds (empty disables them)
    #[arg(short, long, env = "BEAT_QUERY", default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Root of the generated static site
    #[arg(short, long, env = "BEAT_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Optional path to a YAML file overriding feeds, catalog sites and user agent
    #[arg(short, long, env = "BEAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Entries taken from each feed
    #[arg(long, env = "BEAT_PER_FEED_LIMIT", default_value_t = 80)]
    pub per_feed_limit: usize,

    /// Cap on deduplicated items
    #[arg(long, env = "BEAT_MAX_TOTAL", default_value_t = 700)]
    pub max_total: usize,

    /// Number of thumbnails to look up per run
    #[arg(long, env = "BEAT_THUMB_BUDGET", default_value_t = 220)]
    pub thumb_budget: usize,

    /// Pause after each feed fetch, in milliseconds
    #[arg(long, env = "BEAT_FEED_DELAY_MS", default_value_t = 400)]
    pub feed_delay_ms: u64,

    /// Skip writing the monthly HTML archive
    #[arg(long)]
    pub no_archive: bool,

    /// Also rebuild the directory catalog
    #[arg(long)]
    pub build_catalog: bool,

    /// Only rebuild the catalog on `--catalog-weekday`
    #[arg(long)]
    pub weekly_only: bool,

    /// Weekday for `--weekly-only` (mon, tue, ..., sun)
    #[arg(long, env = "BEAT_CATALOG_WEEKDAY", default_value = "sun")]
    pub catalog_weekday: Weekday,

    /// Webhook URLs receiving the newest items (repeatable or comma-separated)
    #[arg(long = "webhook-url", env = "BEAT_WEBHOOK_URLS", value_delimiter = ',')]
    pub webhook_urls: Vec<String>,

    /// Items sent to each webhook
    #[arg(long, env = "BEAT_PUBLISH_LIMIT", default_value_t = 10)]
    pub publish_limit: usize,
}

impl Cli {
    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            query: self.query.clone(),
            per_feed_limit: self.per_feed_limit,
            max_total: self.max_total,
            thumb_budget: self.thumb_budget,
            inter_feed_delay: Duration::from_millis(self.feed_delay_ms),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join("data")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.output_dir.join("archive")
    }

    /// Whether this run should rebuild the catalog at `now`.
    pub fn should_build_catalog(&self, now: DateTime<Utc>) -> bool {
        self.build_catalog && (!self.weekly_only || now.weekday() == self.catalog_weekday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["universal_beat"]);

        assert_eq!(cli.query, DEFAULT_QUERY);
        assert_eq!(cli.output_dir, PathBuf::from("output"));
        assert_eq!(cli.per_feed_limit, 80);
        assert_eq!(cli.max_total, 700);
        assert_eq!(cli.thumb_budget, 220);
        assert_eq!(cli.catalog_weekday, Weekday::Sun);
        assert_eq!(cli.publish_limit, 10);
        assert!(!cli.no_archive);
        assert!(cli.webhook_urls.is_empty());
        assert_eq!(cli.data_dir(), PathBuf::from("output/data"));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["universal_beat", "-q", "metformin", "-o", "/tmp/site"]);

        assert_eq!(cli.query, "metformin");
        assert_eq!(cli.archive_dir(), PathBuf::from("/tmp/site/archive"));
        assert_eq!(cli.aggregate_options().query, "metformin");
    }

    #[test]
    fn test_webhooks_repeatable_and_comma_separated() {
        let cli = Cli::parse_from([
            "universal_beat",
            "--webhook-url",
            "https://a.example/h,https://b.example/h",
            "--webhook-url",
            "https://c.example/h",
        ]);
        assert_eq!(cli.webhook_urls.len(), 3);
    }

    #[test]
    fn test_tuning_flags() {
        let cli = Cli::parse_from([
            "universal_beat",
            "--per-feed-limit",
            "5",
            "--max-total",
            "20",
            "--thumb-budget",
            "0",
            "--feed-delay-ms",
            "0",
            "--no-archive",
        ]);
        let opts = cli.aggregate_options();
        assert_eq!(opts.per_feed_limit, 5);
        assert_eq!(opts.max_total, 20);
        assert_eq!(opts.thumb_budget, 0);
        assert_eq!(opts.inter_feed_delay, Duration::ZERO);
        assert!(cli.no_archive);
    }

    #[test]
    fn test_weekly_catalog_gate() {
        // 2024-03-17 is a Sunday.
        let sunday = Utc.with_ymd_and_hms(2024, 3, 17, 6, 0, 0).unwrap();
        let monday = Utc.with_ymd_and_hms(2024, 3, 18, 6, 0, 0).unwrap();

        let off = Cli::parse_from(["universal_beat"]);
        assert!(!off.should_build_catalog(sunday));

        let always = Cli::parse_from(["universal_beat", "--build-catalog"]);
        assert!(always.should_build_catalog(monday));

        let weekly = Cli::parse_from(["universal_beat", "--build-catalog", "--weekly-only"]);
        assert!(weekly.should_build_catalog(sunday));
        assert!(!weekly.should_build_catalog(monday));

        let mondays = Cli::parse_from([
            "universal_beat",
            "--build-catalog",
            "--weekly-only",
            "--catalog-weekday",
            "mon",
        ]);
        assert!(mondays.should_build_catalog(monday));
    }
}
