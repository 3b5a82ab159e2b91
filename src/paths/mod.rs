//! Static path table: asset class → {source, output, watch}.
//!
//! Built once at startup from the configured source/output roots. The
//! layout below the roots is fixed:
//!
//! | class     | source                  | watch                   | output            |
//! |-----------|-------------------------|-------------------------|-------------------|
//! | pages     | `views/pages/**/*.pug`  | `views/**/*.pug`        | `./`              |
//! | styles    | `assets/sass/main.sass` | `**/*.{sass,scss,css}`  | `assets/css/`     |
//! | scripts   | `assets/js/index.js`    | `**/*.js`               | `assets/js/`      |
//! | images    | `assets/images/**/*`    | same                    | `assets/images/`  |
//! | videos    | `assets/videos/**/*`    | same                    | `assets/videos/`  |
//! | documents | `assets/docs/**/*`      | same                    | `assets/docs/`    |
//! | fonts     | `assets/fonts/**/*`     | same                    | `assets/fonts/`   |

mod pattern;

pub use pattern::{Pattern, join_pattern};

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::config::KilnConfig;
use crate::core::AssetClass;

/// Source maps live next to each compiled-asset output directory.
pub const MAPS_DIR: &str = "../maps";

#[derive(Debug, Error)]
pub enum PathError {
    #[error("invalid glob `{0}`: {1}")]
    Glob(String, String),
}

/// Fixed layout: (class, source suffix, watch suffix, output subdir).
const LAYOUT: [(AssetClass, &str, &str, &str); 7] = [
    (AssetClass::Pages, "views/pages/**/*.pug", "views/**/*.pug", ""),
    (AssetClass::Styles, "assets/sass/main.sass", "**/*.{sass,scss,css}", "assets/css"),
    (AssetClass::Scripts, "assets/js/index.js", "**/*.js", "assets/js"),
    (AssetClass::Images, "assets/images/**/*", "assets/images/**/*", "assets/images"),
    (AssetClass::Videos, "assets/videos/**/*", "assets/videos/**/*", "assets/videos"),
    (AssetClass::Documents, "assets/docs/**/*", "assets/docs/**/*", "assets/docs"),
    (AssetClass::Fonts, "assets/fonts/**/*", "assets/fonts/**/*", "assets/fonts"),
];

/// One row of the path table.
#[derive(Debug, Clone)]
pub struct PathEntry {
    pub class: AssetClass,
    /// Files the processing task reads.
    pub source: Pattern,
    /// Absolute output directory.
    pub output: PathBuf,
    /// Files whose change re-runs the class's watch binding.
    pub watch: Pattern,
}

impl PathEntry {
    /// Absolute source-map directory for compiled classes (`<output>/../maps`).
    pub fn maps_dir(&self) -> PathBuf {
        self.output
            .parent()
            .unwrap_or(&self.output)
            .join(MAPS_DIR.trim_start_matches("../"))
    }
}

/// Immutable mapping from asset class to its paths.
#[derive(Debug, Clone)]
pub struct PathTable {
    root: PathBuf,
    output_root: PathBuf,
    entries: FxHashMap<AssetClass, PathEntry>,
}

impl PathTable {
    /// Build the table from the configured roots.
    pub fn from_config(config: &KilnConfig) -> Result<Self, PathError> {
        Self::new(config.get_root(), &config.paths.source, &config.paths.output)
    }

    /// Build the table for a project `root` with root-relative `source` and `output` dirs.
    pub fn new(root: &Path, source: &Path, output: &Path) -> Result<Self, PathError> {
        let output_root = root.join(output);
        let mut entries = FxHashMap::default();

        for (class, source_suffix, watch_suffix, out_subdir) in LAYOUT {
            let entry = PathEntry {
                class,
                source: Pattern::new(&join_pattern(source, source_suffix))?,
                output: if out_subdir.is_empty() {
                    output_root.clone()
                } else {
                    output_root.join(out_subdir)
                },
                watch: Pattern::new(&join_pattern(source, watch_suffix))?,
            };
            entries.insert(class, entry);
        }

        Ok(Self {
            root: root.to_path_buf(),
            output_root,
            entries,
        })
    }

    /// Project root all patterns are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Output root (deleted by clean, served by the dev server).
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn get(&self, class: AssetClass) -> &PathEntry {
        // LAYOUT covers every AssetClass variant
        &self.entries[&class]
    }

    /// Entries in `AssetClass::ALL` order.
    #[cfg(test)]
    pub fn entries(&self) -> impl Iterator<Item = &PathEntry> {
        AssetClass::ALL.iter().map(|class| self.get(*class))
    }
}
