//! Build-watch notification.
//!
//! Every file the bundler writes is announced through a [`ChangeSink`] so
//! that external incremental-build tooling (or our own watch loop) can react.

use std::path::{Path, PathBuf};

/// One-way notification that a file was written or rewritten.
pub trait ChangeSink {
    fn notify_changed(&mut self, path: &Path);
}

/// Logs changed paths in verbose mode and otherwise discards them.
#[derive(Debug, Default)]
pub struct LogChanges;

impl ChangeSink for LogChanges {
    fn notify_changed(&mut self, path: &Path) {
        crate::debug!("changed"; "{}", path.display());
    }
}

/// Remembers every written path.
///
/// Watch mode uses it to ignore file events caused by its own output.
#[derive(Debug, Default)]
pub struct WrittenFiles {
    order: Vec<PathBuf>,
}

impl WrittenFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Written paths in notification order (duplicates kept).
    pub fn paths(&self) -> &[PathBuf] {
        &self.order
    }

    #[cfg(test)]
    pub fn contains(&self, path: &Path) -> bool {
        self.order.iter().any(|p| p == path)
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }
}

impl ChangeSink for WrittenFiles {
    fn notify_changed(&mut self, path: &Path) {
        self.order.push(path.to_path_buf());
    }
}
