//! Resolution of heterogeneous feed dates into one sortable string.
//!
//! Feeds disagree on where and how they publish timestamps. An entry carries
//! every representation we could find in [`EntryDates`]; [`resolve_date`]
//! walks them in priority order and renders the first usable one as
//! `YYYY-MM-DD HH:MM:SS` in UTC. Zero padding makes plain string comparison
//! agree with chronological order, and the empty string (unresolvable) sorts
//! below every real date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Canonical `strftime` pattern for item dates.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Every date representation found on one raw feed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDates {
    /// Publication time already decoded by the feed parser.
    pub published_parsed: Option<DateTime<Utc>>,
    /// Update time already decoded by the feed parser.
    pub updated_parsed: Option<DateTime<Utc>>,
    /// Raw `pubDate` / `published` text.
    pub published: Option<String>,
    /// Raw `updated` text.
    pub updated: Option<String>,
    /// Raw Dublin Core `dc:date` text.
    pub dc_date: Option<String>,
}

/// Render `dt` in the canonical item format.
pub fn format_canonical(dt: &DateTime<Utc>) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

/// Resolve the best date of an entry, or an empty string.
///
/// Structured values win over raw strings; within each tier `published`
/// is preferred over `updated`, and `dc:date` is the last resort.
pub fn resolve_date(dates: &EntryDates) -> String {
    let structured = dates.published_parsed.or(dates.updated_parsed);
    if let Some(dt) = structured {
        return format_canonical(&dt);
    }

    [&dates.published, &dates.updated, &dates.dc_date]
        .into_iter()
        .flatten()
        .find_map(|raw| parse_raw_date(raw))
        .map(|dt| format_canonical(&dt))
        .unwrap_or_default()
}

/// Parse one raw date string and convert it to UTC.
///
/// RFC 2822 is tried first since that is what RSS mandates. Atom and Dublin
/// Core values are usually RFC 3339; naive timestamps are taken as UTC.
pub fn parse_raw_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
