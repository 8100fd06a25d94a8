//! Best-effort thumbnail lookup for article pages.
//!
//! A page's representative image is taken from, in order:
//! 1. `<meta property="og:image">`
//! 2. `<meta property="og:image:url">`
//! 3. `<meta name="twitter:image">`
//! 4. the first `<img src>` that is not an inline, sprite or tracking pixel
//!
//! Relative URLs are resolved against the page URL. Lookups never fail
//! loudly: any error simply means "no image".

use crate::http::{HttpFetcher, IMAGE_TIMEOUT};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// Resolves a representative image for a page.
pub trait ThumbnailResolver {
    async fn resolve(&self, page_url: &str) -> Option<String>;
}

impl ThumbnailResolver for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn resolve(&self, page_url: &str) -> Option<String> {
        let base = Url::parse(page_url).ok()?;
        match self.get_text(page_url, IMAGE_TIMEOUT).await {
            Ok(html) => extract_image(&html, &base),
            Err(e) => {
                debug!(error = %e, "OG image fetch failed");
                None
            }
        }
    }
}

static META_CANDIDATES: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"meta[property="og:image"]"#,
        r#"meta[property="og:image:url"]"#,
        r#"meta[name="twitter:image"]"#,
    ]
    .iter()
    .filter_map(|css| Selector::parse(css).ok())
    .collect()
});

static IMG_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("img[src]").ok());

const SKIPPED_IMAGE_MARKERS: [&str; 4] = ["data:", "sprite", "pixel", "base64"];

/// Pick the representative image of an HTML document served from `base`.
pub fn extract_image(html: &str, base: &Url) -> Option<String> {
    let document = Html::parse_document(html);

    for selector in META_CANDIDATES.iter() {
        let content = document
            .select(selector)
            .next()
            .and_then(|m| m.value().attr("content"))
            .map(str::trim)
            .filter(|c| !c.is_empty());
        if let Some(content) = content {
            if let Ok(resolved) = base.join(content) {
                return Some(resolved.to_string());
            }
        }
    }

    let img_selector = IMG_SELECTOR.as_ref()?;
    document
        .select(img_selector)
        .filter_map(|img| img.value().attr("src"))
        .filter_map(|src| base.join(src.trim()).ok())
        .map(|u| u.to_string())
        .find(|src| !SKIPPED_IMAGE_MARKERS.iter().any(|bad| src.contains(bad)))
}
