//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_url_path` - map a site-absolute URL path (`/js/app.js`) onto a directory

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a URL path as written in html against a base directory.
///
/// References in the page are site-absolute (`/css/3p/reset.css`), but on disk
/// they live under a source directory. `Path::join` would discard the base for
/// an absolute component, so leading slashes are stripped first.
///
/// # Example
/// ```ignore
/// resolve_url_path(Path::new("src/main"), "/js/app.js") // src/main/js/app.js
/// ```
pub fn resolve_url_path(base: &Path, url_path: &str) -> PathBuf {
    let relative = url_path.trim_start_matches(['/', '\\']);
    let mut resolved = base.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        resolved.push(segment);
    }
    resolved
}
