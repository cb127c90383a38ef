//! Typed config field paths.

use owo_colors::OwoColorize;
use std::fmt;

/// Dotted path of a config key, e.g. `minify.max_line_length`.
///
/// `#[derive(Config)]` generates one per field:
///
/// ```ignore
/// diag.error(MinifyConfig::FIELDS.max_line_length, "must be greater than 0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}
