//! Project configuration management for `kiln.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── paths      # [paths]
//! │   ├── serve      # [serve]
//! │   ├── pages      # [pages]
//! │   ├── styles     # [styles]
//! │   ├── scripts    # [scripts]
//! │   ├── images     # [images]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError
//! ├── util           # config file lookup
//! └── mod.rs         # KilnConfig (this file)
//! ```
//!
//! The config file is optional: without one, every section takes its
//! default and the project root is the current directory.

pub mod section;
mod error;
mod util;

pub use error::ConfigError;
pub use section::{
    ImageFormat, ImagesConfig, PagesConfig, PathsConfig, ScriptsConfig, ServeConfig,
    StylesConfig, WatchConfig,
};

use crate::{
    cli::{Cli, Commands, ServeArgs},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use crate::utils::path::normalize_path;
use util::find_config_file;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KilnConfig {
    /// Absolute path to the config file, empty when none was found (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Source and output roots
    #[serde(default)]
    pub paths: PathsConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Template rendering
    #[serde(default)]
    pub pages: PagesConfig,

    /// Stylesheet compilation
    #[serde(default)]
    pub styles: StylesConfig,

    /// Script bundling
    #[serde(default)]
    pub scripts: ScriptsConfig,

    /// Image conversion
    #[serde(default)]
    pub images: ImagesConfig,

    /// File watcher
    #[serde(default)]
    pub watch: WatchConfig,
}

impl KilnConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.set_root(path.parent().unwrap_or(&cwd));
                config.config_path = path;
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                let mut config = Self::default();
                config.set_root(&cwd);
                config
            }
        };

        crate::logger::set_verbose(cli.verbose);
        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        if let Commands::Dev { serve_args } = cli.command() {
            self.apply_serve_args(&serve_args);
        }
    }

    fn apply_serve_args(&mut self, args: &ServeArgs) {
        if let Some(interface) = args.interface {
            self.serve.interface = interface;
        }
        if let Some(port) = args.port {
            self.serve.port = port;
        }
    }

    /// Reject configurations that would make `clean` destroy sources or make
    /// the watcher react to build output.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let source = self.source_dir();
        let output = self.output_dir();

        if source.starts_with(&output) {
            return Err(ConfigError::Validation(format!(
                "output directory `{}` contains the source directory `{}`; \
                 cleaning it would delete sources",
                self.paths.output.display(),
                self.paths.source.display()
            )));
        }
        if output.starts_with(&source) {
            return Err(ConfigError::Validation(format!(
                "output directory `{}` is inside the source directory `{}`; \
                 the watcher would rebuild on every write",
                self.paths.output.display(),
                self.paths.source.display()
            )));
        }
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(format!(
                "images.quality must be between 1 and 100, got {}",
                self.images.quality
            )));
        }
        if self.pages.command.is_empty() {
            return Err(ConfigError::Validation("pages.command is empty".into()));
        }
        if self.styles.command.is_empty() {
            return Err(ConfigError::Validation("styles.command is empty".into()));
        }
        Ok(())
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path, canonicalized so watcher events
    /// (which report resolved paths) strip against it.
    pub fn set_root(&mut self, path: &Path) {
        self.root = normalize_path(path);
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Absolute source tree root.
    pub fn source_dir(&self) -> PathBuf {
        self.root_join(&self.paths.source)
    }

    /// Absolute output tree root.
    pub fn output_dir(&self) -> PathBuf {
        self.root_join(&self.paths.output)
    }
}

/// Parse config for section tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> KilnConfig {
    KilnConfig::from_str(content).expect("config should parse")
}
