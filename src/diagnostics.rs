//! Minifier diagnostics.
//!
//! Minifiers report problems into a [`DiagnosticSink`] owned by the driver.
//! The sink logs each record as it arrives, keeps warning and error counts,
//! and decides at the end of a run whether the recorded issues fail the build.
//!
//! Rendered form of a record:
//!
//! ```text
//! /js/app.js:line 12:column 5:Expected `;` but found `}`
//! 	var total = items.length }
//! ```

use std::fmt;

use crate::log;

/// Severity of a single diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A problem reported by a minifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Name of the file the problem was found in, if known.
    pub source: Option<String>,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// Text of the offending line.
    pub line_text: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            source: None,
            line: 0,
            column: 0,
            line_text: None,
        }
    }

    #[cfg(test)]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    #[cfg(test)]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Attach a location.
    pub fn at(mut self, source: Option<String>, line: usize, column: usize) -> Self {
        self.source = source;
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_line_text(mut self, text: impl Into<String>) -> Self {
        self.line_text = Some(text.into());
        self
    }

    /// Render with `fallback` used when the record carries no source name.
    pub fn render(&self, fallback: Option<&str>) -> String {
        let mut out = String::new();

        let source = self
            .source
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(fallback);
        if let Some(source) = source {
            out.push_str(&format!(
                "{}:line {}:column {}:",
                source, self.line, self.column
            ));
        }

        if self.message.is_empty() {
            out.push_str("unknown error");
        } else {
            out.push_str(&self.message);
        }

        if let Some(text) = self.line_text.as_deref().filter(|t| !t.is_empty()) {
            out.push_str("\n\t");
            out.push_str(text);
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

/// Accumulates diagnostics for one bundler run.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    /// Source name used for records without one.
    default_source: Option<String>,
    /// Warnings are dropped unless this is set.
    record_warnings: bool,
    warnings: usize,
    errors: usize,
    records: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(record_warnings: bool) -> Self {
        Self {
            record_warnings,
            ..Self::default()
        }
    }

    /// Set the fallback source name. Blank names clear it.
    pub fn set_default_source(&mut self, name: &str) {
        let name = name.trim();
        self.default_source = (!name.is_empty()).then(|| name.to_string());
    }

    pub fn default_source(&self) -> Option<&str> {
        self.default_source.as_deref()
    }

    /// Record a diagnostic according to its severity.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => self.warning(diagnostic),
            Severity::Error => self.error(diagnostic),
        }
    }

    /// Record a warning. Ignored when warnings are not recorded.
    pub fn warning(&mut self, diagnostic: Diagnostic) {
        if !self.record_warnings {
            return;
        }
        log!(Severity::Warning.label(); "{}", self.format(&diagnostic));
        self.warnings += 1;
        self.records.push(Diagnostic {
            severity: Severity::Warning,
            ..diagnostic
        });
    }

    /// Record an error. Errors are always recorded.
    pub fn error(&mut self, diagnostic: Diagnostic) {
        log!(Severity::Error.label(); "{}", self.format(&diagnostic));
        self.errors += 1;
        self.records.push(Diagnostic {
            severity: Severity::Error,
            ..diagnostic
        });
    }

    /// Format a diagnostic, falling back to the default source name.
    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        diagnostic.render(self.default_source.as_deref())
    }

    pub const fn warning_count(&self) -> usize {
        self.warnings
    }

    pub const fn error_count(&self) -> usize {
        self.errors
    }

    #[cfg(test)]
    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Whether the recorded diagnostics fail the run.
    pub const fn is_fatal(&self, fail_on_warning: bool) -> bool {
        self.errors > 0 || (fail_on_warning && self.warnings > 0)
    }
}

/// Convert a byte offset into a 1-based `(line, column)` and the line's text.
///
/// Offsets past the end clamp to the end of `text`; offsets inside a
/// multi-byte character snap back to its start.
pub fn line_col(text: &str, offset: usize) -> (usize, usize, &str) {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    let line = text[..line_start].matches('\n').count() + 1;
    let column = text[line_start..offset].chars().count() + 1;
    let line_text = text[line_start..line_end].trim_end_matches('\r');

    (line, column, line_text)
}
