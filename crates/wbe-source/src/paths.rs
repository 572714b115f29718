//! Path and URL conversion utilities
//!
//! Conversion between `file://` URLs and UTF-8 paths, handling
//! percent-encoding and platform differences.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use url::Url;

/// Convert a `file://` URL to a [`Utf8PathBuf`].
///
/// Handles percent-encoding and platform-specific path formats (e.g., Windows drives).
/// Returns `None` for any other scheme.
#[must_use]
pub fn url_to_path(url: &Url) -> Option<Utf8PathBuf> {
    if url.scheme() != "file" {
        return None;
    }

    let path = percent_encoding::percent_decode_str(url.path())
        .decode_utf8()
        .ok()?;

    #[cfg(windows)]
    let path = {
        // Remove leading '/' for paths like /C:/...
        path.strip_prefix('/').unwrap_or(&path)
    };

    Some(Utf8PathBuf::from(path.as_ref()))
}

/// Convert an absolute [`Utf8Path`] to a `file://` URL.
///
/// Relative paths are resolved against the current directory first; if that
/// fails the conversion fails.
#[must_use]
pub fn path_to_url(path: &Utf8Path) -> Option<Url> {
    if path.is_absolute() {
        return Url::from_file_path(path.as_std_path()).ok();
    }

    let absolute = std::fs::canonicalize(path.as_std_path()).ok()?;
    Url::from_file_path(absolute).ok()
}
