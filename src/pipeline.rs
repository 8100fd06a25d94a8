//! The aggregation pipeline: fetch → flatten → dedupe → enrich → sort.
//!
//! Everything runs sequentially in feed-list order, which is what makes
//! "first seen wins" deduplication deterministic across runs. Network
//! failures never abort the pipeline; a failing feed just contributes no
//! items and is logged with its source name.

use crate::config::FeedSource;
use crate::dates::resolve_date;
use crate::feeds::{FeedFetcher, RawEntry, feed_list};
use crate::fingerprint::fingerprint;
use crate::models::Item;
use crate::thumbnail::ThumbnailResolver;
use crate::utils::{SUMMARY_LIMIT, clean_text, truncate};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument};

/// Tuning knobs for one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    /// Search expression; an empty query disables the search feeds.
    pub query: String,
    /// Entries taken from each feed.
    pub per_feed_limit: usize,
    /// Cap on deduplicated items.
    pub max_total: usize,
    /// Number of thumbnails to obtain.
    pub thumb_budget: usize,
    /// Courtesy pause after every feed fetch.
    pub inter_feed_delay: Duration,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            per_feed_limit: 80,
            max_total: 700,
            thumb_budget: 220,
            inter_feed_delay: Duration::from_millis(400),
        }
    }
}

/// Run the whole pipeline and return items ordered newest first.
#[instrument(level = "info", skip_all, fields(query = %opts.query))]
pub async fn aggregate<F, T>(
    opts: &AggregateOptions,
    static_feeds: &[FeedSource],
    fetcher: &F,
    thumbnails: &T,
) -> Vec<Item>
where
    F: FeedFetcher,
    T: ThumbnailResolver,
{
    let feeds = feed_list(&opts.query, static_feeds);
    info!(feeds = feeds.len(), "Fetching feeds");

    let mut all_items = Vec::new();
    for feed in &feeds {
        all_items.extend(fetch_feed_items(fetcher, feed, opts.per_feed_limit).await);
        if !opts.inter_feed_delay.is_zero() {
            sleep(opts.inter_feed_delay).await;
        }
    }
    info!(count = all_items.len(), "Fetched items from all feeds");

    let mut items = dedupe_with_cap(all_items, opts.max_total);
    info!(count = items.len(), "After dedupe");

    let found = enrich_thumbnails(&mut items, thumbnails, opts.thumb_budget).await;
    info!(found, budget = opts.thumb_budget, "Thumbnail enrichment done");

    sort_newest_first(&mut items);
    items
}

/// Fetch one feed and normalize its entries; failures yield no items.
async fn fetch_feed_items<F: FeedFetcher>(fetcher: &F, feed: &FeedSource, limit: usize) -> Vec<Item> {
    match fetcher.fetch_entries(feed, limit).await {
        Ok(entries) => {
            let items: Vec<Item> = entries
                .into_iter()
                .take(limit)
                .map(|entry| item_from_entry(&feed.source, entry))
                .collect();
            info!(source = %feed.source, count = items.len(), "Fetched feed");
            items
        }
        Err(e) => {
            error!(source = %feed.source, url = %feed.url, error = %e, "Feed fetch failed");
            Vec::new()
        }
    }
}

/// Normalize one raw feed entry into an [`Item`].
pub fn item_from_entry(source: &str, entry: RawEntry) -> Item {
    let body = entry
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or(entry.description.as_deref())
        .unwrap_or_default();

    Item {
        source: source.to_string(),
        title: clean_text(entry.title.as_deref().unwrap_or_default()),
        link: entry.link.as_deref().unwrap_or_default().trim().to_string(),
        summary: truncate(body, SUMMARY_LIMIT),
        date: resolve_date(&entry.dates),
        image: None,
    }
}

/// Keep the first item of every fingerprint, skipping incomplete items,
/// until `max_total` items are kept.
pub fn dedupe_with_cap(items: Vec<Item>, max_total: usize) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();

    for item in items {
        if kept.len() >= max_total {
            break;
        }
        if !item.is_complete() {
            continue;
        }
        if seen.insert(fingerprint(&item.title, &item.link)) {
            kept.push(item);
        }
    }
    kept
}

/// Look up thumbnails in order until `budget` images were found.
///
/// Only successful lookups consume budget. Returns the number of images set.
pub async fn enrich_thumbnails<T: ThumbnailResolver>(
    items: &mut [Item],
    resolver: &T,
    budget: usize,
) -> usize {
    let mut remaining = budget;
    for item in items.iter_mut() {
        if remaining == 0 {
            break;
        }
        if let Some(image) = resolver.resolve(&item.link).await {
            item.image = Some(image);
            remaining -= 1;
        }
    }
    budget - remaining
}

/// Stable sort by date, newest first; undated items sink to the end.
pub fn sort_newest_first(items: &mut [Item]) {
    items.sort_by(|a, b| b.date.cmp(&a.date));
}
