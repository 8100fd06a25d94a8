//! Output writers for the static site.
//!
//! # Submodules
//!
//! - [`json`]: `data/items.json`, `data/catalog.json` and the `.nojekyll` marker
//! - [`archive`]: month-paginated HTML archive with a search index
//!
//! # Output Structure
//!
//! ```text
//! output/
//! ├── .nojekyll
//! ├── data/
//! │   ├── items.json
//! │   ├── catalog.json
//! │   └── logs.txt
//! └── archive/
//!     ├── index.html
//!     ├── 2024-03.html
//!     └── unknown.html
//! ```

pub mod archive;
pub mod json;
