//! Data models for aggregated items and the directory catalog.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Item`]: one normalized feed entry, the unit persisted in `items.json`
//! - [`CatalogRecord`]: one scraped directory entry before bucketing
//! - [`Catalog`]: the bucketed directory persisted in `catalog.json`
//!
//! Optional fields serialize as `null` instead of being skipped so that the
//! site's JavaScript can rely on every key being present.

use serde::{Deserialize, Serialize};

/// One aggregated news or evidence entry.
///
/// Items are created fresh on every run. After creation only [`Item::image`]
/// is ever changed, by the thumbnail enrichment pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Item {
    /// Label of the feed the entry came from (e.g. `"NIH"`).
    pub source: String,
    /// Plain-text headline.
    pub title: String,
    /// Canonical URL of the story.
    pub link: String,
    /// Plain-text excerpt, at most 360 characters plus an ellipsis.
    pub summary: String,
    /// `YYYY-MM-DD HH:MM:SS` in UTC, or empty when no date could be resolved.
    pub date: String,
    /// Absolute URL of a representative thumbnail.
    pub image: Option<String>,
}

impl Item {
    /// An item is only kept when it has both a headline and a link.
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.link.is_empty()
    }
}

/// The kind of directory entry a catalog source produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Program,
    Expert,
    Institution,
}

/// A scraped directory entry, prior to bucketing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub kind: RecordKind,
    pub name: String,
    pub url: String,
    pub image: Option<String>,
    pub location: Option<String>,
    /// Free-form descriptor; becomes `category`, `specialty` or `focus`
    /// depending on [`CatalogRecord::kind`].
    pub descriptor: Option<String>,
    /// Only programs carry a description.
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// A bucketed program entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProgramEntry {
    pub name: String,
    pub category: String,
    pub description: String,
    pub location: String,
    pub url: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

/// A bucketed expert entry. `rating` is always emitted, as `null` when unknown.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExpertEntry {
    pub name: String,
    pub specialty: String,
    pub location: String,
    pub rating: Option<f32>,
    pub url: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

/// A bucketed institution entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InstitutionEntry {
    pub name: String,
    pub focus: String,
    pub location: String,
    pub url: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

/// The directory catalog persisted as `catalog.json`.
///
/// [`Catalog::default`] is the empty placeholder written when no catalog
/// build has run yet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Catalog {
    pub programs: Vec<ProgramEntry>,
    pub experts: Vec<ExpertEntry>,
    pub institutions: Vec<InstitutionEntry>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.programs.len() + self.experts.len() + self.institutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, link: &str) -> Item {
        Item {
            source: "NIH".to_string(),
            title: title.to_string(),
            link: link.to_string(),
            summary: String::new(),
            date: String::new(),
            image: None,
        }
    }

    #[test]
    fn test_item_completeness() {
        assert!(item("Title", "https://nih.gov/a").is_complete());
        assert!(!item("", "https://nih.gov/a").is_complete());
        assert!(!item("Title", "").is_complete());
    }

    #[test]
    fn test_item_serializes_missing_image_as_null() {
        let json = serde_json::to_string(&item("T", "https://x.com")).unwrap();
        assert!(json.contains("\"image\":null"));
        assert!(json.contains("\"date\":\"\""));
    }

    #[test]
    fn test_item_deserialization() {
        let json = r#"{
            "source": "WHO",
            "title": "Report",
            "link": "https://who.int/r",
            "summary": "Short",
            "date": "2024-03-15 10:30:00",
            "image": "https://who.int/r.png"
        }"#;

        let parsed: Item = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.source, "WHO");
        assert_eq!(parsed.image.as_deref(), Some("https://who.int/r.png"));
    }

    #[test]
    fn test_empty_catalog_placeholder_shape() {
        let json = serde_json::to_value(Catalog::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"programs": [], "experts": [], "institutions": []})
        );
    }

    #[test]
    fn test_expert_rating_is_emitted_as_null() {
        let expert = ExpertEntry {
            name: "Dr. A".to_string(),
            specialty: "—".to_string(),
            location: "—".to_string(),
            rating: None,
            url: "https://a.org".to_string(),
            image: None,
            tags: vec![],
        };
        let json = serde_json::to_value(&expert).unwrap();
        assert!(json.get("rating").unwrap().is_null());
        assert!(json.get("image").unwrap().is_null());
    }

    #[test]
    fn test_record_kind_lowercase() {
        let kind: RecordKind = serde_yaml::from_str("institution").unwrap();
        assert_eq!(kind, RecordKind::Institution);
        assert_eq!(serde_json::to_string(&RecordKind::Program).unwrap(), "\"program\"");
    }
}
