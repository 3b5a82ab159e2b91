//! Asset class definitions.

use std::fmt;

/// Category of source files sharing a source pattern, an output directory
/// and a processing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetClass {
    /// Templates rendered to markup at the output root
    Pages,
    /// Single stylesheet entry point
    Styles,
    /// Single script entry point
    Scripts,
    /// Raster and vector images (copied, rasters also converted)
    Images,
    /// Video files (copied verbatim)
    Videos,
    /// Downloadable documents (copied verbatim)
    Documents,
    /// Web fonts (copied verbatim)
    Fonts,
}

impl AssetClass {
    /// Every asset class, in path table order.
    pub const ALL: [Self; 7] = [
        Self::Pages,
        Self::Styles,
        Self::Scripts,
        Self::Images,
        Self::Videos,
        Self::Documents,
        Self::Fonts,
    ];

    /// Short lowercase name used in logs and notifications.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Images => "images",
            Self::Videos => "videos",
            Self::Documents => "docs",
            Self::Fonts => "fonts",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
