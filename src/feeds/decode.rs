//! RSS/Atom decoding into [`RawEntry`] values.
//!
//! Decoding is delegated to `feed-rs`, which also decodes entry timestamps.
//! Real-world feeds are often not well-formed enough for it (stray HTML
//! entities, odd date formats). A rejected document gets a second, lenient
//! pass with `quick-xml` that keeps the raw date strings for the
//! [`crate::dates`] fallback chain. The same pass supplies raw dates for
//! accepted documents whose entry timestamps `feed-rs` could not decode.
//!
//! The lenient structs name prefixed elements (`dc:date`,
//! `content:encoded`) by their local name; quick-xml matches on that.

use super::RawEntry;
use crate::dates::EntryDates;
use crate::error::{BeatError, Result};
use serde::Deserialize;
use tracing::debug;

/// Decode `body` and return at most `limit` entries.
pub fn decode_feed(body: &[u8], limit: usize) -> Result<Vec<RawEntry>> {
    match feed_rs::parser::parse(body) {
        Ok(feed) => {
            let mut entries: Vec<RawEntry> =
                feed.entries.into_iter().take(limit).map(from_feed_rs).collect();
            if entries.iter().any(lacks_parsed_dates) {
                fill_raw_dates(&mut entries, body, limit);
            }
            Ok(entries)
        }
        Err(strict) => {
            debug!(error = %strict, "Strict feed decode failed; trying lenient decoder");
            decode_lenient(body, limit)
        }
    }
}

fn lacks_parsed_dates(entry: &RawEntry) -> bool {
    entry.dates.published_parsed.is_none() && entry.dates.updated_parsed.is_none()
}

/// Copy raw date strings from the lenient pass onto entries whose dates
/// `feed-rs` could not decode. Entries are matched by link, or by position
/// when both passes saw the same number of entries.
fn fill_raw_dates(entries: &mut [RawEntry], body: &[u8], limit: usize) {
    let raw = match decode_lenient(body, limit) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "Lenient pass for raw dates failed");
            return;
        }
    };
    let aligned = raw.len() == entries.len();

    for (idx, entry) in entries.iter_mut().enumerate() {
        if !lacks_parsed_dates(entry) {
            continue;
        }
        let link = entry.link.as_deref().map(str::trim);
        let by_link = link.and_then(|l| {
            raw.iter()
                .find(|r| r.link.as_deref().map(str::trim) == Some(l))
        });
        let source = by_link.or_else(|| aligned.then(|| &raw[idx]));
        if let Some(source) = source {
            entry.dates.published = source.dates.published.clone();
            entry.dates.updated = source.dates.updated.clone();
            entry.dates.dc_date = source.dates.dc_date.clone();
        }
    }
}

fn from_feed_rs(entry: feed_rs::model::Entry) -> RawEntry {
    // Prefer an alternate link; `self` points back at the feed itself.
    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref().unwrap_or("alternate") != "self")
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone());

    RawEntry {
        title: entry.title.map(|t| t.content),
        link,
        summary: entry.summary.map(|s| s.content),
        description: entry.content.and_then(|c| c.body),
        dates: EntryDates {
            published_parsed: entry.published,
            updated_parsed: entry.updated,
            ..Default::default()
        },
    }
}

/// Any of RSS 2.0 (`channel/item`), RSS 1.0 (`item` beside `channel`) or
/// Atom (`entry`); the root element name is not checked.
#[derive(Debug, Default, Deserialize)]
struct LenientDocument {
    #[serde(default)]
    channel: Option<LenientChannel>,
    #[serde(default, rename = "item")]
    items: Vec<RssItem>,
    #[serde(default, rename = "entry")]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct LenientChannel {
    #[serde(default, rename = "item")]
    items: Vec<RssItem>,
}

#[derive(Debug, Default, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "encoded")]
    content_encoded: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "date")]
    dc_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    #[serde(default, rename = "link")]
    links: Vec<AtomLink>,
    summary: Option<String>,
    content: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    #[serde(rename = "date")]
    dc_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl From<RssItem> for RawEntry {
    fn from(item: RssItem) -> Self {
        RawEntry {
            title: item.title,
            link: item.link,
            summary: item.description,
            description: item.content_encoded,
            dates: EntryDates {
                published: item.pub_date,
                dc_date: item.dc_date,
                ..Default::default()
            },
        }
    }
}

impl From<AtomEntry> for RawEntry {
    fn from(entry: AtomEntry) -> Self {
        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref().unwrap_or("alternate") != "self")
            .and_then(|l| l.href.clone());

        RawEntry {
            title: entry.title,
            link,
            summary: entry.summary,
            description: entry.content,
            dates: EntryDates {
                published: entry.published,
                updated: entry.updated,
                dc_date: entry.dc_date,
                ..Default::default()
            },
        }
    }
}

fn decode_lenient(body: &[u8], limit: usize) -> Result<Vec<RawEntry>> {
    let text = String::from_utf8_lossy(body);
    let xml = scrub_html_entities_for_xml(text.trim_start_matches('\u{feff}'));
    let doc: LenientDocument =
        quick_xml::de::from_str(&xml).map_err(|e| BeatError::Feed(e.to_string()))?;

    let LenientDocument {
        channel,
        items,
        entries,
    } = doc;

    let rss = channel
        .map(|c| c.items)
        .unwrap_or_default()
        .into_iter()
        .chain(items)
        .map(RawEntry::from);
    let atom = entries.into_iter().map(RawEntry::from);

    Ok(rss.chain(atom).take(limit).collect())
}

/// Replace HTML-only entities that are not valid in XML.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
