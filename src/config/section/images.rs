//! `[images]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [images]
//! format = "webp"                     # Converted format: webp | avif
//! quality = 75                        # Lossy encoder quality, 1-100
//! convert_exclude = ["favicon/**"]    # Globs relative to the images source dir
//! ```

use serde::{Deserialize, Serialize};

/// Space-efficient format raster images are converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Webp,
    Avif,
}

impl ImageFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Avif => "avif",
        }
    }
}

/// Image conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Output format for converted images.
    pub format: ImageFormat,

    /// Encoder quality, 1-100.
    pub quality: u8,

    /// Paths (globs relative to the images source dir) copied but never converted.
    pub convert_exclude: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            format: ImageFormat::Webp,
            quality: 75,
            convert_exclude: vec!["favicon/**".into()],
        }
    }
}
