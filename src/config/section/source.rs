//! `[source]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [source]
//! scripts = "src/main"
//! assets = "src/main/resources"
//! html = "/index.html"
//! ```
//!
//! Script references (`/js/...`) resolve under `scripts`; stylesheet references
//! and the html page resolve under `assets`.

use std::path::{Path, PathBuf};

use macros::Config;
use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::utils::path::resolve_url_path;

/// Where the page and the files it references live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Config)]
#[serde(default)]
#[config(section = "source")]
pub struct SourceConfig {
    /// Directory `/js/...` references are read from.
    pub scripts: PathBuf,

    /// Directory stylesheet references and the html page are read from.
    /// Bundles and rewritten pages are written here too.
    pub assets: PathBuf,

    /// Input html page, as a path inside `assets`.
    pub html: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            scripts: "src/main".into(),
            assets: "src/main/resources".into(),
            html: "/index.html".into(),
        }
    }
}

impl SourceConfig {
    /// Resolve relative directories against `root`.
    pub fn normalize(&mut self, root: &Path) {
        self.scripts = crate::utils::path::normalize_path(&root.join(&self.scripts));
        self.assets = crate::utils::path::normalize_path(&root.join(&self.assets));
    }

    /// Input html page on disk.
    pub fn html_path(&self) -> PathBuf {
        resolve_url_path(&self.assets, &self.html)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, dir) in [
            (Self::FIELDS.scripts, &self.scripts),
            (Self::FIELDS.assets, &self.assets),
        ] {
            if !dir.is_dir() {
                diag.error_with_hint(
                    field,
                    format!("directory `{}` not found", dir.display()),
                    "paths are relative to the directory containing uberpack.toml",
                );
            }
        }

        if self.html.trim_matches('/').is_empty() {
            diag.error(Self::FIELDS.html, "must name an html file");
        } else if !self.html_path().is_file() {
            diag.error(
                Self::FIELDS.html,
                format!("`{}` not found in the asset directory", self.html),
            );
        }
    }
}
