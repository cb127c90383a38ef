//! File aggregation.
//!
//! Concatenates referenced files in document order. Each file is followed by
//! exactly one platform line separator, so the joined text for `[a, b]` is
//! `a + SEP + b + SEP`. The line layout is part of the contract: diagnostics
//! refer to lines of the joined text, and [`JoinedSource::locate`] maps them
//! back to the file they came from.

use std::fs;
use std::path::Path;

use super::BundleError;
use crate::diagnostics::{Diagnostic, Severity, line_col};
use crate::utils::path::resolve_url_path;

/// Line separator appended after every joined file.
pub const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Lines one input file occupies in the joined text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Reference path as written in the html.
    pub name: String,
    /// 1-based line in the joined text where the file starts.
    pub first_line: usize,
    /// Number of joined lines, including the separator's line break.
    pub line_count: usize,
}

/// Concatenated minifier input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinedSource {
    content: String,
    segments: Vec<Segment>,
}

impl JoinedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-joined text that has no per-file layout.
    #[cfg(test)]
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            segments: Vec::new(),
        }
    }

    /// Append one file's contents followed by [`LINE_SEPARATOR`].
    pub fn push(&mut self, name: &str, contents: &str) {
        let first_line = self.segments.last().map_or(1, |s| s.first_line + s.line_count);
        self.segments.push(Segment {
            name: name.to_string(),
            first_line,
            line_count: contents.matches('\n').count() + 1,
        });
        self.content.push_str(contents);
        self.content.push_str(LINE_SEPARATOR);
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    #[cfg(test)]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Map a 1-based joined line to `(file, line within file)`.
    pub fn locate(&self, line: usize) -> Option<(&str, usize)> {
        self.segments
            .iter()
            .find(|s| line >= s.first_line && line < s.first_line + s.line_count)
            .map(|s| (s.name.as_str(), line - s.first_line + 1))
    }

    /// Build a diagnostic for a 1-based line and column of the joined text.
    pub fn diagnostic_at(
        &self,
        severity: Severity,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Diagnostic {
        let line_text = self
            .content
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or_default();
        let (source, line) = match self.locate(line) {
            Some((name, line)) => (Some(name.to_string()), line),
            None => (None, line),
        };
        Diagnostic::new(severity, message)
            .at(source, line, column)
            .with_line_text(line_text)
    }

    /// Build a diagnostic for a byte offset into the joined text.
    ///
    /// Without an offset the diagnostic carries no position.
    pub fn diagnostic(
        &self,
        severity: Severity,
        message: impl Into<String>,
        offset: Option<usize>,
    ) -> Diagnostic {
        match offset {
            Some(offset) => {
                let (line, column, _) = line_col(&self.content, offset);
                self.diagnostic_at(severity, message, line, column)
            }
            None => Diagnostic::new(severity, message),
        }
    }
}

/// Read `paths` relative to `base_dir` and concatenate them in order.
///
/// Paths are site-absolute (`/js/app.js`); see [`resolve_url_path`]. Missing
/// or unreadable files fail the join with the offending path.
pub fn join(base_dir: &Path, paths: &[String]) -> Result<JoinedSource, BundleError> {
    let mut joined = JoinedSource::new();
    for path in paths {
        let file = resolve_url_path(base_dir, path);
        let contents = fs::read_to_string(&file).map_err(|e| BundleError::Read(file, e))?;
        joined.push(path, &contents);
    }
    Ok(joined)
}
