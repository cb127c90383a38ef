//! `[minify]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [minify]
//! warn = true
//! fail_on_warning = false
//! max_line_length = 500
//! ```

use macros::Config;
use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Minifier settings shared by the script and stylesheet bundles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Config)]
#[serde(default)]
#[config(section = "minify")]
pub struct MinifyConfig {
    /// Record and print minifier warnings.
    /// The bundled oxc and lightningcss parsers report syntax errors only,
    /// so this matters for minifiers that emit warnings.
    pub warn: bool,

    /// Fail the run if any warning was recorded. Implies `warn`.
    pub fail_on_warning: bool,

    /// Break output lines after a statement or rule once this column is reached.
    #[config(inline_doc = "unset: no line breaks")]
    pub max_line_length: Option<usize>,

    /// Keep local identifier names in scripts.
    pub no_mangle: bool,

    /// Keep every script semicolon by printing one statement per line.
    /// Spacing inside statements is kept as well, so scripts grow larger.
    pub preserve_semicolons: bool,

    /// Skip script compression passes.
    pub disable_optimizations: bool,
}

impl MinifyConfig {
    /// Whether warnings are recorded at all.
    pub const fn records_warnings(&self) -> bool {
        self.warn || self.fail_on_warning
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.max_line_length == Some(0) {
            diag.error_with_hint(
                Self::FIELDS.max_line_length,
                "must be greater than 0",
                "remove the key to disable line breaking",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_minify_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.minify, MinifyConfig::default());
        assert!(!config.minify.records_warnings());
        assert_eq!(config.minify.max_line_length, None);
    }

    #[test]
    fn test_fail_on_warning_implies_warn() {
        let config = test_parse_config("[minify]\nfail_on_warning = true");
        assert!(!config.minify.warn);
        assert!(config.minify.records_warnings());
    }

    #[test]
    fn test_minify_validate_line_length() {
        let config = test_parse_config("[minify]\nmax_line_length = 0");
        let mut diag = ConfigDiagnostics::new();
        config.minify.validate(&mut diag);
        assert_eq!(diag.errors()[0].field.as_str(), "minify.max_line_length");
    }
}
