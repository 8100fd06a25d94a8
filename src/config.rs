//! Site configuration: feed list, catalog site map and HTTP identity.
//!
//! Everything here has a built-in default so the binary runs without a config
//! file. A YAML file passed with `--config` may override any top-level
//! section; omitted sections keep their defaults.
//!
//! ```yaml
//! user_agent: "Mozilla/5.0 (MyBeat/1.0)"
//! feeds:
//!   - source: NIH
//!     url: https://www.nih.gov/news-events/news-releases/rss.xml
//! catalog_sites:
//!   - key: example_clinic
//!     mode: single
//!     kind: institution
//!     url: https://clinic.example/
//!     name: Example Clinic
//!     tags: [clinic]
//! ```

use crate::error::Result;
use crate::models::RecordKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (UHA/2.1; +GitHub Pages Agent)";

/// A labelled feed URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedSource {
    pub source: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(source: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            url: url.into(),
        }
    }
}

/// How a catalog site yields records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogMode {
    /// Exactly one record built from the configured metadata.
    Single,
    /// One record per outbound link found on the page.
    Outlinks,
}

/// One entry of the catalog site map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteConfig {
    pub key: String,
    pub mode: CatalogMode,
    pub kind: RecordKind,
    pub url: String,
    /// Comma-separated selector candidates, tried in order.
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Category, specialty or focus, depending on `kind`.
    #[serde(default)]
    pub descriptor: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BeatConfig {
    pub user_agent: String,
    pub feeds: Vec<FeedSource>,
    pub catalog_sites: Vec<SiteConfig>,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            feeds: default_feeds(),
            catalog_sites: default_catalog_sites(),
        }
    }
}

impl BeatConfig {
    /// Load the config file at `path`, or the built-in defaults when `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        info!(
            feeds = config.feeds.len(),
            catalog_sites = config.catalog_sites.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

/// The static list of reputable health and science feeds.
pub fn default_feeds() -> Vec<FeedSource> {
    [
        ("NIH", "https://www.nih.gov/news-events/news-releases/rss.xml"),
        ("WHO", "https://www.who.int/feeds/entity/mediacentre/news/en/rss.xml"),
        ("CDC", "https://tools.cdc.gov/api/v2/resources/media/403372.rss"),
        ("Cochrane News", "https://www.cochrane.org/news-feed.xml"),
        ("Nature", "https://www.nature.com/nature.rss"),
        ("BMJ", "https://www.bmj.com/latest.xml"),
        ("Lancet", "https://www.thelancet.com/rssfeed/lancet_current.xml"),
        ("PLOS Medicine", "https://journals.plos.org/plosmedicine/feed/atom"),
        ("ScienceDaily Health", "https://www.sciencedaily.com/rss/health_medicine.xml"),
        ("ScienceDaily Top", "https://www.sciencedaily.com/rss/top.xml"),
        ("bioRxiv Latest", "https://www.biorxiv.org/rss/latest.xml"),
        ("medRxiv Latest", "https://www.medrxiv.org/rss/latest.xml"),
    ]
    .into_iter()
    .map(|(source, url)| FeedSource::new(source, url))
    .collect()
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

fn outlinks(key: &str, kind: RecordKind, url: &str, container: &str, tag_list: &[&str]) -> SiteConfig {
    SiteConfig {
        key: key.to_string(),
        mode: CatalogMode::Outlinks,
        kind,
        url: url.to_string(),
        container: Some(container.to_string()),
        name: None,
        location: None,
        descriptor: None,
        description: None,
        tags: tags(tag_list),
    }
}

/// The built-in catalog site map.
pub fn default_catalog_sites() -> Vec<SiteConfig> {
    vec![
        outlinks(
            "scispot_top20_longevity_biotechs",
            RecordKind::Institution,
            "https://www.scispot.com/blog/top-20-of-most-innovative-anti-aging-companies-in-the-world",
            "article, main, .blog-content, .prose",
            &["longevity", "biotech", "companies"],
        ),
        outlinks(
            "labiotech_top_biotech_companies",
            RecordKind::Institution,
            "https://www.labiotech.eu/best-biotech/anti-aging-biotech-companies/",
            "article, main, .single-content, .article__content",
            &["longevity", "biotech", "companies"],
        ),
        outlinks(
            "longevity_clinic_top18",
            RecordKind::Institution,
            "https://longevity-clinic.co.uk/what-is-the-best-longevity-clinic-in-the-world/",
            "article, main, .entry-content, .content",
            &["longevity", "clinic", "ranking"],
        ),
        outlinks(
            "lifespan_rejuvenation_roadmap",
            RecordKind::Program,
            "https://www.lifespan.io/road-maps/the-rejuvenation-roadmap/",
            "article, main, #content, .entry-content, .wrap",
            &["rejuvenation", "roadmap", "programs"],
        ),
        SiteConfig {
            key: "dr_kalidas_center".to_string(),
            mode: CatalogMode::Single,
            kind: RecordKind::Institution,
            url: "https://drkalidas.com/".to_string(),
            container: None,
            name: Some("The Center for Natural & Integrative Medicine (Dr. Kalidas)".to_string()),
            location: Some("Orlando, Florida, USA".to_string()),
            descriptor: None,
            description: None,
            tags: tags(&["integrative", "naturopathic", "clinic"]),
        },
    ]
}
