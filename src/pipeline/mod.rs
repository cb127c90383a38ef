//! Html rewriting and bundle production.
//!
//! # Architecture
//!
//! ```text
//! input html
//!   │ strip_comments → collapse           (collapse.rs)
//!   ▼
//! document ──► BundlePipeline(css)  ──► BundlePipeline(css/3p) ──► BundlePipeline(js) ──► BundlePipeline(js/3p) ──► uber html
//!               │ extract_and_swap      (extract.rs)
//!               │ join                  (join.rs)
//!               │ TextMinifier          (asset::minify)
//!               └ write + ChangeSink
//! ```
//!
//! The document is a plain `String` moved into each pass and returned by it.

mod collapse;
mod error;
mod extract;
mod join;

pub use collapse::{DEFAULT_STYLESHEET, LESS_MARKER, collapse, strip_comments, stylesheet_tag};
pub use error::BundleError;
pub use extract::{Extraction, extract_and_swap};
pub use join::{JoinedSource, join};
#[cfg(test)]
pub use join::LINE_SEPARATOR;

use std::fs;
use std::path::{Path, PathBuf};

use crate::asset::TextMinifier;
use crate::core::{BundleCategory, ChangeSink};
use crate::diagnostics::DiagnosticSink;
use crate::{debug, log};

/// Extract → join → minify → write for one bundle category.
#[derive(Debug, Clone)]
pub struct BundlePipeline<'a> {
    pub category: BundleCategory,
    /// Directory referenced files are read from.
    pub source_dir: &'a Path,
    /// Bundle reference written into the html.
    pub output_url: &'a str,
    /// Bundle file on disk.
    pub output_path: PathBuf,
}

/// What one pipeline run produced.
#[derive(Debug, Clone)]
pub struct BundleOutcome {
    pub category: BundleCategory,
    /// Files folded into the bundle, in order.
    pub sources: Vec<String>,
    pub output: PathBuf,
    /// Bytes written.
    pub size: usize,
}

impl BundlePipeline<'_> {
    /// Run the pipeline over `document`, returning the rewritten document
    /// for the next pass.
    ///
    /// A category without references still writes an (empty) bundle.
    pub fn run(
        &self,
        document: String,
        minifier: &dyn TextMinifier,
        sink: &mut DiagnosticSink,
        changes: &mut dyn ChangeSink,
    ) -> Result<(String, BundleOutcome), BundleError> {
        let Extraction { paths, document } =
            extract_and_swap(document, self.category.pattern(), self.output_url);
        debug!("extract"; "{}: {:?}", self.category.name(), paths);

        let joined = join(self.source_dir, &paths)?;
        debug_assert_eq!(minifier.kind(), self.category.kind());

        sink.set_default_source(self.output_url);
        let minified = minifier.minify(&joined, sink)?;

        write_output(&self.output_path, &minified, changes)?;
        log!("bundle"; "generated {}", self.output_path.display());

        let outcome = BundleOutcome {
            category: self.category,
            sources: paths,
            output: self.output_path.clone(),
            size: minified.len(),
        };
        Ok((document, outcome))
    }
}

/// Write `contents` to `path`, creating parent directories, then announce it.
pub fn write_output(
    path: &Path,
    contents: &str,
    changes: &mut dyn ChangeSink,
) -> Result<(), BundleError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BundleError::Write(parent.to_path_buf(), e))?;
    }
    fs::write(path, contents).map_err(|e| BundleError::Write(path.to_path_buf(), e))?;
    changes.notify_changed(path);
    Ok(())
}
