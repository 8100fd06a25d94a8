//! JSON data files served next to the static site.
//!
//! # Output Structure
//!
//! ```text
//! output/
//! ├── .nojekyll
//! └── data/
//!     ├── items.json
//!     ├── catalog.json
//!     └── longevity_plan.json
//! ```

use crate::error::Result;
use crate::models::{Catalog, Item};
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

pub const ITEMS_FILE: &str = "items.json";
pub const CATALOG_FILE: &str = "catalog.json";
pub const PLAN_FILE: &str = "longevity_plan.json";
pub const NOJEKYLL_FILE: &str = ".nojekyll";

/// Write the aggregated items as a pretty-printed array to `data_dir/items.json`.
#[instrument(level = "info", skip_all, fields(data_dir = %data_dir.display(), count = items.len()))]
pub async fn write_items(items: &[Item], data_dir: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(items)?;
    write_file(data_dir, ITEMS_FILE, json).await
}

/// Write a freshly built catalog to `data_dir/catalog.json`.
#[instrument(level = "info", skip_all, fields(data_dir = %data_dir.display(), records = catalog.len()))]
pub async fn write_catalog(catalog: &Catalog, data_dir: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog)?;
    write_file(data_dir, CATALOG_FILE, json).await
}

/// Make sure `catalog.json` exists, writing an empty catalog only when the
/// file is missing. Returns `true` if a placeholder was written.
pub async fn ensure_catalog_placeholder(data_dir: &Path) -> Result<bool> {
    let json = serde_json::to_string_pretty(&Catalog::default())?;
    ensure_placeholder(data_dir, CATALOG_FILE, json).await
}

/// Make sure the front end's `longevity_plan.json` exists (an empty array
/// when missing). Returns `true` if a placeholder was written.
pub async fn ensure_plan_placeholder(data_dir: &Path) -> Result<bool> {
    ensure_placeholder(data_dir, PLAN_FILE, "[]".to_string()).await
}

#[instrument(level = "debug", skip(data_dir, contents), fields(data_dir = %data_dir.display()))]
async fn ensure_placeholder(data_dir: &Path, name: &str, contents: String) -> Result<bool> {
    if fs::try_exists(data_dir.join(name)).await? {
        return Ok(false);
    }
    write_file(data_dir, name, contents).await?;
    Ok(true)
}

/// Empty `.nojekyll` marker at the site root.
pub async fn write_nojekyll(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir).await?;
    fs::write(output_dir.join(NOJEKYLL_FILE), b"").await?;
    Ok(())
}

async fn write_file(dir: &Path, name: &str, contents: String) -> Result<()> {
    if let Err(e) = fs::create_dir_all(dir).await {
        error!(dir = %dir.display(), error = %e, "Failed to create data dir");
        return Err(e.into());
    }
    let path = dir.join(name);
    fs::write(&path, contents).await?;
    info!(path = %path.display(), "Wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InstitutionEntry, Item};
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("universal_beat_json_{name}_{}", std::process::id()))
    }

    #[tokio::test]
    async fn test_items_are_pretty_array() {
        let dir = scratch("items");
        let items = vec![Item {
            source: "WHO".to_string(),
            title: "Update".to_string(),
            link: "https://who.int/a".to_string(),
            summary: "Short".to_string(),
            date: "2024-03-15 10:30:00".to_string(),
            image: None,
        }];
        write_items(&items, &dir).await.unwrap();

        let raw = std::fs::read_to_string(dir.join(ITEMS_FILE)).unwrap();
        assert!(raw.starts_with("[\n"));
        let back: Vec<Item> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, items);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_placeholder_never_clobbers() {
        let dir = scratch("placeholder");
        let _ = std::fs::remove_dir_all(&dir);

        assert!(ensure_catalog_placeholder(&dir).await.unwrap());
        let empty: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join(CATALOG_FILE)).unwrap()).unwrap();
        assert_eq!(
            empty,
            serde_json::json!({"programs": [], "experts": [], "institutions": []})
        );

        let catalog = Catalog {
            institutions: vec![InstitutionEntry {
                name: "Clinic".to_string(),
                focus: "Longevity / Clinic / Biotech".to_string(),
                location: "—".to_string(),
                url: "https://clinic.example".to_string(),
                image: None,
                tags: vec![],
            }],
            ..Default::default()
        };
        write_catalog(&catalog, &dir).await.unwrap();
        assert!(!ensure_catalog_placeholder(&dir).await.unwrap());

        let kept: Catalog =
            serde_json::from_str(&std::fs::read_to_string(dir.join(CATALOG_FILE)).unwrap()).unwrap();
        assert_eq!(kept.institutions.len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_plan_placeholder_is_empty_array_and_kept() {
        let dir = scratch("plan");
        let _ = std::fs::remove_dir_all(&dir);

        assert!(ensure_plan_placeholder(&dir).await.unwrap());
        assert_eq!(std::fs::read_to_string(dir.join(PLAN_FILE)).unwrap(), "[]");

        std::fs::write(dir.join(PLAN_FILE), r#"[{"step":"walk"}]"#).unwrap();
        assert!(!ensure_plan_placeholder(&dir).await.unwrap());
        assert_eq!(
            std::fs::read_to_string(dir.join(PLAN_FILE)).unwrap(),
            r#"[{"step":"walk"}]"#
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_nojekyll_marker() {
        let dir = scratch("nojekyll");
        write_nojekyll(&dir).await.unwrap();
        assert!(dir.join(NOJEKYLL_FILE).is_file());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
