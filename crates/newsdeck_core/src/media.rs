//! Image embedding and source resolution for card artwork.
//!
//! # Responsibility
//! - Embed an uploaded image file as a `data:` URL so it survives inside a
//!   stored card row without a separate asset store.
//! - Resolve a stored `main_image` value to a renderable source.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Root under which named image assets are served.
pub const IMAGE_ASSET_ROOT: &str = "/images/";

/// Media embedding errors.
#[derive(Debug)]
pub enum MediaError {
    /// Extension does not map to a supported image MIME type.
    UnsupportedExtension(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for MediaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedExtension(ext) => {
                write!(f, "unsupported image extension `{ext}`")
            }
            Self::Io { path, source } => {
                write!(f, "cannot read image `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for MediaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::UnsupportedExtension(_) => None,
        }
    }
}

/// Reads an image file and embeds it as a base64 `data:` URL.
pub fn image_file_to_data_url(path: &Path) -> Result<String, MediaError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let mime = mime_for_extension(&extension)
        .ok_or_else(|| MediaError::UnsupportedExtension(extension.clone()))?;

    let bytes = fs::read(path).map_err(|source| MediaError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Resolves a stored image value to a renderable source.
///
/// Embedded `data:` URLs pass through; named assets resolve under the
/// image asset root.
pub fn resolve_image_src(value: &str) -> String {
    if value.starts_with("data:") {
        value.to_string()
    } else {
        format!("{IMAGE_ASSET_ROOT}{value}")
    }
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{mime_for_extension, resolve_image_src};

    #[test]
    fn data_urls_pass_through_unchanged() {
        let url = "data:image/png;base64,AAAA";
        assert_eq!(resolve_image_src(url), url);
    }

    #[test]
    fn asset_names_resolve_under_the_image_root() {
        assert_eq!(resolve_image_src("default.png"), "/images/default.png");
    }

    #[test]
    fn known_extensions_map_to_mime_types() {
        assert_eq!(mime_for_extension("png"), Some("image/png"));
        assert_eq!(mime_for_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("exe"), None);
    }
}
