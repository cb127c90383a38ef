//! `[preprocess]` section configuration.

use macros::Config;
use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::pipeline::DEFAULT_STYLESHEET;

/// Html rewrites applied before bundling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Config)]
#[serde(default)]
#[config(section = "preprocess")]
pub struct PreprocessConfig {
    /// Remove `<!-- ... -->` comments so commented-out tags are never bundled.
    pub strip_comments: bool,

    /// Replace the in-browser LESS link and script pair with a static stylesheet.
    pub collapse_less: bool,

    /// Precompiled stylesheet the LESS pair is replaced with.
    pub stylesheet: String,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            strip_comments: true,
            collapse_less: true,
            stylesheet: DEFAULT_STYLESHEET.into(),
        }
    }
}

impl PreprocessConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.collapse_less && self.stylesheet.trim_matches('/').is_empty() {
            diag.error(Self::FIELDS.stylesheet, "must not be empty when collapse_less is on");
        }
    }
}
