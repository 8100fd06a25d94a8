//! Text normalization, URL helpers, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Markup stripping and word-safe truncation for summaries
//! - Host extraction used by fingerprinting and the catalog builder
//! - String truncation for log previews
//! - File system validation for output directories

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Display budget for item summaries, in characters.
pub const SUMMARY_LIMIT: usize = 360;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("valid tag regex"));
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Strip tag-like markup and collapse whitespace.
///
/// Every `<...>` run is replaced by a space, then whitespace runs are folded
/// into single spaces and the result is trimmed.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("<p>Hello\n <b>world</b></p>"), "Hello world");
/// assert_eq!(clean_text(""), "");
/// ```
pub fn clean_text(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let stripped = TAG_RE.replace_all(s, " ");
    collapse_whitespace(&stripped)
}

/// Fold whitespace runs into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WS_RE.replace_all(s, " ").trim().to_string()
}

/// Clean `s` and cut it to at most `limit` characters without splitting a word.
///
/// When the cleaned text is longer than `limit`, the first `limit`
/// characters are kept, then everything after their last space is dropped
/// and a single `…` is appended, so the output never exceeds `limit + 1`
/// characters. This backs up one word even when the cut lands exactly on a
/// word boundary. A prefix with no space at all (one enormous token) is
/// hard-cut at `limit`.
pub fn truncate(s: &str, limit: usize) -> String {
    let cleaned = clean_text(s);
    if cleaned.chars().count() <= limit {
        return cleaned;
    }

    let prefix: String = cleaned.chars().take(limit).collect();
    let kept = match prefix.rfind(' ') {
        Some(idx) => prefix[..idx].trim_end(),
        None => prefix.as_str(),
    };
    format!("{kept}…")
}

/// Lowercase network location (host plus explicit port) of `link`.
///
/// Returns an empty string when `link` is not an absolute URL.
pub fn host_of(link: &str) -> String {
    let Ok(url) = Url::parse(link.trim()) else {
        return String::new();
    };
    let host = url.host_str().unwrap_or_default().to_lowercase();
    match url.port() {
        Some(port) if !host.is_empty() => format!("{host}:{port}"),
        _ => host,
    }
}

/// Host of `link` with a leading `www.` removed.
pub fn site_of(link: &str) -> String {
    let host = host_of(link);
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and byte count
/// indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe = path.join(".write_probe");
    fs::write(&probe, b"ok").await?;
    fs::remove_file(&probe).await?;
    info!("Directory is writable");
    Ok(())
}
