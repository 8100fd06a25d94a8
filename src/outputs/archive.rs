//! Monthly HTML archive pages and the archive index.
//!
//! Items are partitioned by the `YYYY-MM` prefix of their date; undated
//! items go to the `unknown` page. Each month page lists items newest first
//! under day headers. The index links every month and carries a small
//! client-side search over `data/items.json`.
//!
//! # Output Structure
//!
//! ```text
//! output/archive/
//! ├── index.html
//! ├── 2024-03.html
//! ├── 2024-02.html
//! └── unknown.html
//! ```

use crate::dates::CANONICAL_FORMAT;
use crate::error::Result;
use crate::models::Item;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Partition key for items without a usable date.
pub const UNKNOWN_MONTH: &str = "unknown";

const PAGE_STYLE: &str = "<style>body{font-family:system-ui,Arial;margin:20px;background:#f8f9fa;color:#212529}\
a{color:#0d6efd;text-decoration:none}a:hover{text-decoration:underline}\
.wrap{max-width:900px;margin:0 auto}.head{display:flex;justify-content:space-between;align-items:center}\
h1{margin:0 0 8px 0}h3{margin:16px 0 6px}.item{padding:6px 0;border-bottom:1px solid #e9ecef;overflow:hidden}\
.month{padding:8px 0;border-bottom:1px solid #e9ecef}\
.date{color:#6c757d;font-size:.9em;margin-right:8px}.summary{margin:4px 0 0 0;color:#495057;font-size:.95em}\
.thumb{float:right;max-width:120px;max-height:80px;margin-left:12px;border-radius:4px}\
.new{background:#198754;color:#fff;border-radius:3px;font-size:.75em;padding:1px 5px;margin-right:6px}\
#q{width:100%;padding:8px;font-size:1em;box-sizing:border-box;margin:8px 0}</style>";

const SEARCH_SCRIPT: &str = r#"<script>
(function () {
  var box = document.getElementById('q');
  var out = document.getElementById('results');
  var items = [];
  function esc(s) {
    return String(s || '').replace(/[&<>"']/g, function (c) {
      return {'&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'}[c];
    });
  }
  function safeHref(link) {
    return /^https?:\/\//i.test(String(link || '')) ? link : '#';
  }
  function matches(it, q) {
    return String(it.title || '').toLowerCase().indexOf(q) !== -1 ||
      String(it.summary || '').toLowerCase().indexOf(q) !== -1;
  }
  function render() {
    var q = box.value.trim().toLowerCase();
    if (!q) { out.innerHTML = ''; return; }
    out.innerHTML = items.filter(function (it) { return matches(it, q); }).map(function (it) {
      return '<div class="item"><span class="date">' + esc(it.date) + '</span>' +
        '<a target="_blank" rel="noopener" href="' + esc(safeHref(it.link)) + '">' + esc(it.title) + '</a>' +
        '<p class="summary">' + esc(it.summary) + '</p></div>';
    }).join('');
  }
  fetch('../data/items.json')
    .then(function (r) { return r.json(); })
    .then(function (data) { items = Array.isArray(data) ? data : []; render(); })
    .catch(function () { items = []; });
  box.addEventListener('input', render);
})();
</script>"#;

/// Rendered archive documents, keyed by month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub month_pages: BTreeMap<String, String>,
    pub index_page: String,
}

/// `YYYY-MM` prefix of a canonical date, or [`UNKNOWN_MONTH`].
pub fn month_key(date: &str) -> String {
    match date.get(..7) {
        Some(prefix) if !date.is_empty() => prefix.to_string(),
        _ => UNKNOWN_MONTH.to_string(),
    }
}

/// Group items by month, each group sorted newest first (stable).
pub fn partition_by_month(items: &[Item]) -> BTreeMap<String, Vec<&Item>> {
    let mut by_month: BTreeMap<String, Vec<&Item>> = BTreeMap::new();
    for item in items {
        by_month.entry(month_key(&item.date)).or_default().push(item);
    }
    for group in by_month.values_mut() {
        group.sort_by(|a, b| b.date.cmp(&a.date));
    }
    by_month
}

/// Month keys newest first, with [`UNKNOWN_MONTH`] always last.
pub fn ordered_month_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    let mut ordered: Vec<&str> = keys.into_iter().map(String::as_str).collect();
    ordered.sort_by(|a, b| {
        (*a == UNKNOWN_MONTH)
            .cmp(&(*b == UNKNOWN_MONTH))
            .then_with(|| b.cmp(a))
    });
    ordered
}

/// Human label for a month key, e.g. `March 2024`.
pub fn month_label(key: &str) -> String {
    if key == UNKNOWN_MONTH {
        return "Unknown dates".to_string();
    }
    NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d")
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|_| key.to_string())
}

/// Whether an item dated `date` is less than 24 hours old at `now`.
pub fn is_new(date: &str, now: DateTime<Utc>) -> bool {
    NaiveDateTime::parse_from_str(date, CANONICAL_FORMAT)
        .map(|naive| now.signed_duration_since(naive.and_utc()) < Duration::hours(24))
        .unwrap_or(false)
}

/// `link` when it is an absolute http(s) URL, otherwise `#`.
pub fn safe_href(link: &str) -> &str {
    match Url::parse(link.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => link,
        _ => "#",
    }
}

fn day_of(date: &str) -> &str {
    date.get(..10).unwrap_or_default()
}

/// Render one month page. `items` must already be sorted newest first.
pub fn render_month_page(key: &str, items: &[&Item], now: DateTime<Utc>) -> String {
    let title = if key == UNKNOWN_MONTH {
        "Archive — Unknown dates".to_string()
    } else {
        format!("Archive — {key}")
    };

    let mut html = String::new();
    html.push_str(&format!(
        "<!doctype html><meta charset=\"utf-8\"><title>{}</title>\n",
        text(&title)
    ));
    html.push_str(PAGE_STYLE);
    html.push_str("\n<div class=\"wrap\">\n");
    html.push_str(&format!(
        "<div class=\"head\"><h1>{}</h1><a href=\"./index.html\">← Archive</a></div>\n",
        text(&title)
    ));
    html.push_str(&format!("<p>{} items, newest first.</p>\n", items.len()));

    for (day, group) in &items.iter().chunk_by(|item| day_of(&item.date).to_string()) {
        let header = if day.is_empty() { "Undated" } else { day.as_str() };
        html.push_str(&format!("<h3>{}</h3>\n", text(header)));
        for item in group {
            html.push_str(&render_item(item, now));
        }
    }

    html.push_str("</div>\n");
    html
}

fn render_item(item: &Item, now: DateTime<Utc>) -> String {
    let link = safe_href(&item.link);
    let badge = if is_new(&item.date, now) {
        "<span class=\"new\">new</span>"
    } else {
        ""
    };
    let thumb = item
        .image
        .as_deref()
        .map(|src| format!("<img class=\"thumb\" loading=\"lazy\" alt=\"\" src=\"{}\">", attr(src)))
        .unwrap_or_default();
    let summary = if item.summary.is_empty() {
        String::new()
    } else {
        format!("<p class=\"summary\">{}</p>", text(&item.summary))
    };

    format!(
        "<div class=\"item\">{thumb}{badge}<span class=\"date\">{}</span>\
<a target=\"_blank\" rel=\"noopener\" href=\"{}\">{}</a>{summary}</div>\n",
        text(&item.date),
        attr(link),
        text(&item.title),
    )
}

/// Render the archive index linking the given month keys (in order).
pub fn render_index_page(month_keys: &[&str]) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html><meta charset=\"utf-8\"><title>Archive</title>\n");
    html.push_str(PAGE_STYLE);
    html.push_str("\n<div class=\"wrap\"><h1>Archive</h1><p>Browse by month.</p>");
    html.push_str("<p><a href=\"../index.html\">← Home</a></p>\n");
    html.push_str(
        "<input id=\"q\" type=\"search\" placeholder=\"Search titles and summaries…\" autocomplete=\"off\">\n\
<div id=\"results\"></div>\n",
    );

    for key in month_keys {
        html.push_str(&format!(
            "<div class=\"month\"><a href=\"./{}.html\">{}</a></div>\n",
            attr(key),
            text(&month_label(key))
        ));
    }

    html.push_str("</div>\n");
    html.push_str(SEARCH_SCRIPT);
    html.push('\n');
    html
}

/// Render every month page plus the index for `items`.
pub fn build_archive(items: &[Item], now: DateTime<Utc>) -> Archive {
    let by_month = partition_by_month(items);
    let month_pages = by_month
        .iter()
        .map(|(key, group)| (key.clone(), render_month_page(key, group, now)))
        .collect();
    let keys = ordered_month_keys(by_month.keys());
    Archive {
        month_pages,
        index_page: render_index_page(&keys),
    }
}

/// Write `archive` into `archive_dir` as `<key>.html` and `index.html`.
#[instrument(level = "info", skip_all, fields(archive_dir = %archive_dir.display()))]
pub async fn write_archive(archive: &Archive, archive_dir: &Path) -> Result<()> {
    fs::create_dir_all(archive_dir).await?;
    for (key, page) in &archive.month_pages {
        fs::write(archive_dir.join(format!("{key}.html")), page).await?;
    }
    fs::write(archive_dir.join("index.html"), &archive.index_page).await?;
    info!(months = archive.month_pages.len(), "Wrote archive pages");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(title: &str, date: &str) -> Item {
        Item {
            source: "NIH".to_string(),
            title: title.to_string(),
            link: format!("https://nih.gov/{}", title.replace(' ', "-")),
            summary: format!("About {title}"),
            date: date.to_string(),
            image: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 16, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key("2024-03-15 10:30:00"), "2024-03");
        assert_eq!(month_key(""), UNKNOWN_MONTH);
        assert_eq!(month_key("2024"), UNKNOWN_MONTH);
    }

    #[test]
    fn test_partition_scenario() {
        let items = vec![
            item("early", "2024-03-02 08:00:00"),
            item("undated", ""),
            item("late", "2024-03-15 10:30:00"),
        ];
        let parts = partition_by_month(&items);
        assert_eq!(parts.len(), 2);
        let march: Vec<&str> = parts["2024-03"].iter().map(|i| i.title.as_str()).collect();
        assert_eq!(march, vec!["late", "early"]);
        assert_eq!(parts[UNKNOWN_MONTH][0].title, "undated");
    }

    #[test]
    fn test_month_order_unknown_last() {
        let keys: Vec<String> = ["2023-12", UNKNOWN_MONTH, "2024-03", "2024-01"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            ordered_month_keys(&keys),
            vec!["2024-03", "2024-01", "2023-12", UNKNOWN_MONTH]
        );
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label("2024-03"), "March 2024");
        assert_eq!(month_label(UNKNOWN_MONTH), "Unknown dates");
    }

    #[test]
    fn test_is_new() {
        assert!(is_new("2024-03-16 08:00:00", now()));
        assert!(is_new("2024-03-15 09:00:01", now()));
        assert!(!is_new("2024-03-15 09:00:00", now()));
        assert!(!is_new("", now()));
    }

    #[test]
    fn test_month_page_groups_days_and_escapes() {
        let mut fresh = item("Fresh <b>finding</b>", "2024-03-16 07:00:00");
        fresh.image = Some("https://cdn.nih.gov/a.jpg?x=1&y=2".to_string());
        let older = item("Older", "2024-03-02 08:00:00");
        let page = render_month_page("2024-03", &[&fresh, &older], now());

        assert!(page.contains("<title>Archive — 2024-03</title>"));
        let first_day = page.find("<h3>2024-03-16</h3>").unwrap();
        let second_day = page.find("<h3>2024-03-02</h3>").unwrap();
        assert!(first_day < second_day);
        assert!(page.contains("Fresh &lt;b&gt;finding&lt;/b&gt;"));
        assert!(page.contains("src=\"https://cdn.nih.gov/a.jpg?x=1&amp;y=2\""));
        assert_eq!(page.matches("class=\"new\"").count(), 1);
        assert!(page.contains("<p class=\"summary\">About Older</p>"));
    }

    #[test]
    fn test_only_web_links_are_clickable() {
        assert_eq!(safe_href("https://nih.gov/a"), "https://nih.gov/a");
        assert_eq!(safe_href("HTTP://nih.gov/a"), "HTTP://nih.gov/a");
        assert_eq!(safe_href("javascript:alert(1)"), "#");
        assert_eq!(safe_href(" JavaScript:alert(1)"), "#");
        assert_eq!(safe_href("data:text/html,hi"), "#");
        assert_eq!(safe_href(""), "#");

        let mut hostile = item("Click me", "2024-03-15 10:30:00");
        hostile.link = "javascript:alert(document.cookie)".to_string();
        let page = render_month_page("2024-03", &[&hostile], now());
        assert!(!page.contains("javascript:"));
        assert!(page.contains("href=\"#\">Click me</a>"));

        let index = render_index_page(&["2024-03"]);
        assert!(index.contains("safeHref(it.link)"));
    }

    #[test]
    fn test_unknown_page_uses_undated_header() {
        let undated = item("Mystery", "");
        let page = render_month_page(UNKNOWN_MONTH, &[&undated], now());
        assert!(page.contains("<h3>Undated</h3>"));
        assert!(page.contains("Unknown dates"));
    }

    #[test]
    fn test_index_lists_months_and_search() {
        let items = vec![
            item("a", "2024-02-10 00:00:00"),
            item("b", ""),
            item("c", "2024-03-15 10:30:00"),
        ];
        let archive = build_archive(&items, now());
        assert_eq!(archive.month_pages.len(), 3);

        let index = &archive.index_page;
        let march = index.find("./2024-03.html").unwrap();
        let feb = index.find("./2024-02.html").unwrap();
        let unknown = index.find("./unknown.html").unwrap();
        assert!(march < feb && feb < unknown);
        assert!(index.contains(">March 2024<"));
        assert!(index.contains("../data/items.json"));
        assert!(index.contains("<div id=\"results\"></div>"));
    }

    #[tokio::test]
    async fn test_write_archive() {
        let dir = std::env::temp_dir().join(format!("universal_beat_archive_{}", std::process::id()));
        let archive = build_archive(&[item("a", "2024-03-15 10:30:00"), item("b", "")], now());
        write_archive(&archive, &dir).await.unwrap();

        assert!(dir.join("index.html").is_file());
        assert!(dir.join("2024-03.html").is_file());
        assert!(dir.join("unknown.html").is_file());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
