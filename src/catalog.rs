//! Directory catalog: scrape configured sites into programs, experts and
//! institutions.
//!
//! Each site in the catalog map either yields one record from its own
//! metadata (`single`) or one record per outbound link on its page
//! (`outlinks`). Records from all sites are merged, deduplicated by
//! `(name, domain)` and bucketed by kind. A site that cannot be fetched
//! contributes nothing; the build itself never fails.

use crate::config::{CatalogMode, SiteConfig};
use crate::error::{BeatError, Result};
use crate::http::{HttpFetcher, PAGE_TIMEOUT};
use crate::models::{
    Catalog, CatalogRecord, ExpertEntry, InstitutionEntry, ProgramEntry, RecordKind,
};
use crate::thumbnail::ThumbnailResolver;
use crate::utils::{collapse_whitespace, host_of, site_of};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Longest anchor text kept as a record name.
pub const NAME_LIMIT: usize = 120;

const PLACEHOLDER: &str = "—";
const DEFAULT_PROGRAM_DESCRIPTION: &str = "External resource from roadmap";
const DEFAULT_INSTITUTION_FOCUS: &str = "Longevity / Clinic / Biotech";

const SOCIAL_LABELS: [&str; 6] = [
    "facebook",
    "twitter",
    "instagram",
    "linkedin",
    "pinterest",
    "reddit",
];

static ANCHOR_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("a[href]").ok());

/// Downloads the HTML of catalog pages.
pub trait PageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.get_text(url, PAGE_TIMEOUT).await
    }
}

/// An outbound link found on a catalog page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outlink {
    pub name: String,
    pub url: String,
}

/// Whether `host` belongs to a social network we never catalog.
fn is_social(host: &str) -> bool {
    host == "x.com"
        || host.ends_with(".x.com")
        || host.split('.').any(|label| SOCIAL_LABELS.contains(&label))
}

/// Whether `link_site` is `page_site` or one of its subdomains.
fn is_same_site(page_site: &str, link_site: &str) -> bool {
    link_site == page_site || link_site.ends_with(&format!(".{page_site}"))
}

fn parse_selectors(container: &str) -> Vec<Selector> {
    container
        .split(',')
        .map(str::trim)
        .filter(|css| !css.is_empty())
        .filter_map(|css| {
            Selector::parse(css)
                .map_err(|_| BeatError::Selector(css.to_string()))
                .inspect_err(|e| warn!(error = %e, "Skipping container selector"))
                .ok()
        })
        .collect()
}

/// Visible anchor text, or the link's domain when the text is empty or a URL.
fn anchor_name(anchor: &ElementRef, href: &str) -> String {
    let text = collapse_whitespace(&anchor.text().collect::<Vec<_>>().join(" "));
    let text: String = text.chars().take(NAME_LIMIT).collect();
    let lower = text.to_lowercase();
    if !text.is_empty() && !lower.starts_with("http://") && !lower.starts_with("https://") {
        return text;
    }
    let site = site_of(href);
    if site.is_empty() { href.to_string() } else { site }
}

/// Outbound links of `html` served from `page_url`.
///
/// Links are taken from the first element matching one of the
/// comma-separated `container` selectors, or from the whole document.
/// Only http(s) links to other sites are kept, social networks excluded,
/// and each `(domain, url without fragment)` is reported once.
pub fn extract_outlinks(html: &str, page_url: &Url, container: Option<&str>) -> Vec<Outlink> {
    let Some(anchor_selector) = ANCHOR_SELECTOR.as_ref() else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let root = parse_selectors(container.unwrap_or_default())
        .iter()
        .find_map(|selector| document.select(selector).next())
        .unwrap_or_else(|| document.root_element());

    let page_site = site_of(page_url.as_str());
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in root.select(anchor_selector) {
        let Some(raw) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = page_url.join(raw.trim()) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        let href = resolved.to_string();
        let link_site = site_of(&href);
        if link_site.is_empty() || is_same_site(&page_site, &link_site) || is_social(&link_site) {
            continue;
        }

        let mut without_fragment = resolved.clone();
        without_fragment.set_fragment(None);
        if !seen.insert((host_of(&href), without_fragment.to_string())) {
            continue;
        }

        links.push(Outlink {
            name: anchor_name(&anchor, &href),
            url: href,
        });
    }
    links
}

fn record(site: &SiteConfig, name: String, url: String, image: Option<String>) -> CatalogRecord {
    CatalogRecord {
        kind: site.kind,
        name,
        url,
        image,
        location: site.location.clone(),
        descriptor: site.descriptor.clone(),
        description: site.description.clone(),
        tags: site.tags.clone(),
    }
}

/// The one record of a `single` site. The name defaults to the URL's domain.
pub async fn scrape_single<T: ThumbnailResolver>(site: &SiteConfig, thumbs: &T) -> CatalogRecord {
    let name = site
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| host_of(&site.url));
    let image = thumbs.resolve(&site.url).await;
    info!(site = %site.key, %name, "Catalog single record");
    record(site, name, site.url.clone(), image)
}

/// One record per outbound link on an `outlinks` site's page.
#[instrument(level = "info", skip_all, fields(site = %site.key))]
pub async fn scrape_outlinks<P, T>(site: &SiteConfig, pages: &P, thumbs: &T) -> Result<Vec<CatalogRecord>>
where
    P: PageFetcher,
    T: ThumbnailResolver,
{
    let page_url = Url::parse(&site.url)?;
    let html = pages.fetch_page(&site.url).await?;
    let links = extract_outlinks(&html, &page_url, site.container.as_deref());

    let mut records = Vec::with_capacity(links.len());
    for link in links {
        let image = thumbs.resolve(&link.url).await;
        records.push(record(site, link.name, link.url, image));
    }
    info!(count = records.len(), url = %site.url, "Catalog outlinks");
    Ok(records)
}

/// Keep the first record per `(lowercase trimmed name, domain)`, dropping
/// records whose name or domain is empty.
pub fn dedupe_records(records: Vec<CatalogRecord>) -> Vec<CatalogRecord> {
    records
        .into_iter()
        .map(|r| (r.name.trim().to_lowercase(), host_of(&r.url), r))
        .filter(|(name, domain, _)| !name.is_empty() && !domain.is_empty())
        .unique_by(|(name, domain, _)| (name.clone(), domain.clone()))
        .map(|(_, _, r)| r)
        .collect()
}

fn or_placeholder(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Sort records into the three catalog buckets, filling defaults.
pub fn bucket(records: Vec<CatalogRecord>) -> Catalog {
    let mut catalog = Catalog::default();
    for r in records {
        match r.kind {
            RecordKind::Program => catalog.programs.push(ProgramEntry {
                name: r.name,
                category: or_placeholder(r.descriptor, PLACEHOLDER),
                description: or_placeholder(r.description, DEFAULT_PROGRAM_DESCRIPTION),
                location: or_placeholder(r.location, PLACEHOLDER),
                url: r.url,
                image: r.image,
                tags: r.tags,
            }),
            RecordKind::Expert => catalog.experts.push(ExpertEntry {
                name: r.name,
                specialty: or_placeholder(r.descriptor, PLACEHOLDER),
                location: or_placeholder(r.location, PLACEHOLDER),
                rating: None,
                url: r.url,
                image: r.image,
                tags: r.tags,
            }),
            RecordKind::Institution => catalog.institutions.push(InstitutionEntry {
                name: r.name,
                focus: or_placeholder(r.descriptor, DEFAULT_INSTITUTION_FOCUS),
                location: or_placeholder(r.location, PLACEHOLDER),
                url: r.url,
                image: r.image,
                tags: r.tags,
            }),
        }
    }
    catalog
}

/// Scrape every site in order, then dedupe and bucket the records.
#[instrument(level = "info", skip_all, fields(sites = sites.len()))]
pub async fn build_catalog<P, T>(sites: &[SiteConfig], pages: &P, thumbs: &T) -> Catalog
where
    P: PageFetcher,
    T: ThumbnailResolver,
{
    let mut raw = Vec::new();
    for site in sites {
        match site.mode {
            CatalogMode::Single => raw.push(scrape_single(site, thumbs).await),
            CatalogMode::Outlinks => match scrape_outlinks(site, pages, thumbs).await {
                Ok(records) => raw.extend(records),
                Err(e) => error!(site = %site.key, url = %site.url, error = %e, "Catalog source failed"),
            },
        }
    }

    let scraped = raw.len();
    let catalog = bucket(dedupe_records(raw));
    info!(
        scraped,
        programs = catalog.programs.len(),
        experts = catalog.experts.len(),
        institutions = catalog.institutions.len(),
        "Built catalog"
    );
    catalog
}
