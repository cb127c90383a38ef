//! `[output]` section configuration.
//!
//! Every value is a site-absolute path. It is written into the html as-is
//! and the file itself lands at the same path under `source.assets`.

use macros::Config;
use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::core::BundleCategory;

/// Output locations of the rewritten pages and the four bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Config)]
#[serde(default)]
#[config(section = "output")]
pub struct OutputConfig {
    /// Page after the LESS marker has been collapsed.
    pub collapsed_html: String,

    /// Page with every reference swapped for its bundle.
    pub uber_html: String,

    /// Bundle of own stylesheets (`/generated/css/...`).
    pub styles: String,

    /// Bundle of third-party stylesheets (`/css/3p/...`).
    pub third_party_styles: String,

    /// Bundle of own scripts (`/js/...`).
    pub scripts: String,

    /// Bundle of third-party scripts (`/js/3p/...`).
    pub third_party_scripts: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            collapsed_html: "/generated/index-less.html".into(),
            uber_html: "/generated/index-uber.html".into(),
            styles: "/generated/css/uber.css".into(),
            third_party_styles: "/generated/css/3p/uber.css".into(),
            scripts: "/generated/js/uber.js".into(),
            third_party_scripts: "/generated/js/3p/uber.js".into(),
        }
    }
}

impl OutputConfig {
    /// Bundle path for `category`.
    pub fn bundle(&self, category: BundleCategory) -> &str {
        match category {
            BundleCategory::OwnStyle => &self.styles,
            BundleCategory::ThirdPartyStyle => &self.third_party_styles,
            BundleCategory::OwnScript => &self.scripts,
            BundleCategory::ThirdPartyScript => &self.third_party_scripts,
        }
    }

    /// Output paths must be non-empty and pairwise distinct.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let fields = Self::FIELDS;
        let entries = [
            (fields.collapsed_html, &self.collapsed_html),
            (fields.uber_html, &self.uber_html),
            (fields.styles, &self.styles),
            (fields.third_party_styles, &self.third_party_styles),
            (fields.scripts, &self.scripts),
            (fields.third_party_scripts, &self.third_party_scripts),
        ];

        for (i, (field, path)) in entries.iter().enumerate() {
            if path.trim_matches('/').is_empty() {
                diag.error(*field, "must not be empty");
                continue;
            }
            if let Some((other, _)) = entries[..i]
                .iter()
                .find(|(_, earlier)| normalized(earlier) == normalized(path))
            {
                diag.error_with_hint(
                    *field,
                    format!("same file as {other}"),
                    "every output needs its own path",
                );
            }
        }
    }
}

fn normalized(path: &str) -> &str {
    path.trim_start_matches('/')
}
