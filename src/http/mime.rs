//! Content-Type detection for bundled assets.
//!
//! Extensions map onto a closed [`AssetKind`] set; anything unrecognised is
//! served as opaque binary.

/// Kind of asset, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Script,
    Stylesheet,
    Markup,
    Png,
    Jpeg,
    Svg,
    Json,
    Binary,
}

impl AssetKind {
    /// Classify a file extension (without the leading dot).
    ///
    /// Matching is case-insensitive.
    pub fn from_extension(extension: Option<&str>) -> Self {
        let Some(ext) = extension else {
            return Self::Binary;
        };

        match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" => Self::Script,
            "css" => Self::Stylesheet,
            "html" | "htm" => Self::Markup,
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "svg" => Self::Svg,
            "json" => Self::Json,
            _ => Self::Binary,
        }
    }

    /// Classify the final segment of a slash-separated path.
    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        let extension = name.rsplit_once('.').map(|(_, ext)| ext);
        Self::from_extension(extension)
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Script => "application/javascript",
            Self::Stylesheet => "text/css",
            Self::Markup => "text/html",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg => "image/svg+xml",
            Self::Json => "application/json",
            Self::Binary => "application/octet-stream",
        }
    }
}

/// Get the Content-Type for a slash-separated asset path
pub fn get_content_type(path: &str) -> &'static str {
    AssetKind::from_path(path).content_type()
}
