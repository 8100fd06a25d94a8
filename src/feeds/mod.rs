//! Feed sources and the feed-fetching seam.
//!
//! The aggregation pipeline only sees [`RawEntry`] values handed out by a
//! [`FeedFetcher`]. The production fetcher is [`HttpFetcher`], which downloads
//! the document and hands it to [`decode`] for RSS/Atom decoding.
//!
//! # Feed list
//!
//! | Position | Feeds | Notes |
//! |----------|-------|-------|
//! | first | Google News, PubMed | Only when a query is given; query is URL-encoded |
//! | after | static list | 12 health/science feeds, overridable by config |

pub mod decode;

use crate::config::FeedSource;
use crate::dates::EntryDates;
use crate::error::Result;
use crate::http::{FEED_TIMEOUT, HttpFetcher};
use tracing::instrument;

/// One entry as delivered by a feed, before normalization.
///
/// Every field is optional because feeds routinely omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Short summary (`<description>` in RSS, `<summary>` in Atom).
    pub summary: Option<String>,
    /// Full content, used when there is no summary.
    pub description: Option<String>,
    pub dates: EntryDates,
}

/// Retrieves the entries of one feed.
pub trait FeedFetcher {
    /// Fetch at most `limit` entries of `feed`, in document order.
    async fn fetch_entries(&self, feed: &FeedSource, limit: usize) -> Result<Vec<RawEntry>>;
}

impl FeedFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self), fields(source = %feed.source))]
    async fn fetch_entries(&self, feed: &FeedSource, limit: usize) -> Result<Vec<RawEntry>> {
        let body = self.get_bytes(&feed.url, FEED_TIMEOUT).await?;
        decode::decode_feed(&body, limit)
    }
}

/// Google News RSS search for `query`.
pub fn google_news_feed(query: &str) -> String {
    let lang = "en-IN";
    let short = lang.split('-').next().unwrap_or(lang);
    format!(
        "https://news.google.com/rss/search?q={}&hl={lang}&gl=IN&ceid=IN:{short}",
        urlencoding::encode(query)
    )
}

/// PubMed RSS search for `query`, newest first.
pub fn pubmed_feed(query: &str) -> String {
    format!(
        "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/erss.cgi?db=pubmed&term={}&sort=date",
        urlencoding::encode(query)
    )
}

/// Feeds to fetch for `query`: the two search feeds (when `query` is not
/// blank) followed by the static list.
pub fn feed_list(query: &str, static_feeds: &[FeedSource]) -> Vec<FeedSource> {
    let query = query.trim();
    let mut feeds = Vec::with_capacity(static_feeds.len() + 2);
    if !query.is_empty() {
        feeds.push(FeedSource::new("Google News", google_news_feed(query)));
        feeds.push(FeedSource::new("PubMed", pubmed_feed(query)));
    }
    feeds.extend_from_slice(static_feeds);
    feeds
}
