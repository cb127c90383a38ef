//! Watch mode: bundle, then re-bundle whenever a source file changes.
//!
//! The notify watcher thread only forwards events over a channel. Debouncing
//! and rebuilding happen on the calling thread, so runs never overlap.
//! Files the bundler wrote during the previous run are ignored, otherwise
//! every run would trigger the next one.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::{RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

use super::build::bundle;
use crate::config::BundlerConfig;
use crate::core::{WrittenFiles, is_shutdown};
use crate::logger::{status_error, status_success, status_warning};
use crate::utils::{path::normalize_path, plural_count};
use crate::{debug, log};

const DEBOUNCE_MS: u64 = 300;
const REBUILD_COOLDOWN_MS: u64 = 800;
/// Upper bound on a single wait, so Ctrl+C is noticed promptly.
const POLL_MS: u64 = 100;

/// `watch` command entry point.
pub fn watch(config: &BundlerConfig) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("failed to start file watcher")?;

    for dir in watch_roots(&[config.source.scripts.as_path(), config.source.assets.as_path()]) {
        watcher
            .watch(&dir, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch `{}`", dir.display()))?;
        log!("watch"; "watching {}", config.root_relative(&dir).display());
    }

    let mut written = WrittenFiles::new();
    let mut debouncer = Debouncer::new();
    rebuild(config, &mut written, &mut debouncer);

    while !is_shutdown() {
        let timeout = debouncer
            .sleep_duration()
            .min(Duration::from_millis(POLL_MS));
        match rx.recv_timeout(timeout) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(e)) => log!("watch"; "notify error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(changed) = debouncer.take_if_ready() {
            for path in &changed {
                debug!("watch"; "changed: {}", path.display());
            }
            log!("watch"; "{} changed, rebundling", plural_count(changed.len(), "file"));
            rebuild(config, &mut written, &mut debouncer);
        }
    }

    Ok(())
}

/// Run the bundler and report the result in the status line.
fn rebuild(config: &BundlerConfig, written: &mut WrittenFiles, debouncer: &mut Debouncer) {
    written.clear();
    match bundle(config, written) {
        Ok(report) if report.warnings > 0 => status_warning(&format!(
            "bundled {} with {}",
            plural_count(report.source_count(), "file"),
            plural_count(report.warnings, "warning")
        )),
        Ok(report) => status_success(&format!(
            "bundled {}",
            plural_count(report.source_count(), "file")
        )),
        Err(e) => status_error("bundle failed", &format!("{e:#}")),
    }
    debouncer.ignore_written(written);
}

/// Drop roots nested inside another root; a recursive watch already covers them.
fn watch_roots(dirs: &[&Path]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for dir in dirs {
        let dir = normalize_path(dir);
        if roots.iter().any(|root| dir.starts_with(root)) {
            continue;
        }
        roots.retain(|root| !root.starts_with(&dir));
        roots.push(dir);
    }
    roots
}

/// Collects changed paths until events have been quiet for [`DEBOUNCE_MS`].
struct Debouncer {
    changes: FxHashSet<PathBuf>,
    /// Output of the last run, plus the directories holding it.
    ignored: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_build: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            changes: FxHashSet::default(),
            ignored: FxHashSet::default(),
            last_event: None,
            last_build: None,
        }
    }

    /// Replace the ignore list with what the last run wrote.
    fn ignore_written(&mut self, written: &WrittenFiles) {
        self.ignored.clear();
        for path in written.paths() {
            let path = normalize_path(path);
            // creating an output file also touches its parent directories
            self.ignored.extend(path.ancestors().skip(1).map(Path::to_path_buf));
            self.ignored.insert(path);
        }
        // events that arrived during the run are about its own output
        self.changes.retain(|path| !self.ignored.contains(path));
        self.last_build = Some(Instant::now());
    }

    fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            // mtime/atime/chmod noise
            EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => {}
            _ => return,
        }

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let path = normalize_path(path);
            if self.ignored.contains(&path) {
                continue;
            }
            self.changes.insert(path);
            self.last_event = Some(Instant::now());
        }
    }

    fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }

        if let Some(last_build) = self.last_build
            && last_build.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS)
        {
            return false;
        }

        !self.changes.is_empty()
    }

    fn take_if_ready(&mut self) -> Option<Vec<PathBuf>> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        let mut changes: Vec<_> = self.changes.drain().collect();
        changes.sort();
        Some(changes)
    }

    /// Time until the pending changes could become ready.
    fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        let debounce_remaining =
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());
        let cooldown_remaining = self
            .last_build
            .map(|t| Duration::from_millis(REBUILD_COOLDOWN_MS).saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }
}

/// Editor swap and backup files.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChangeSink;

    fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
        notify::Event {
            kind,
            paths: paths.into_iter().map(PathBuf::from).collect(),
            attrs: Default::default(),
        }
    }

    fn modify_kind() -> notify::EventKind {
        notify::EventKind::Modify(notify::event::ModifyKind::Data(
            notify::event::DataChange::Any,
        ))
    }

    fn metadata_kind() -> notify::EventKind {
        notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
            notify::event::MetadataKind::WriteTime,
        ))
    }

    #[test]
    fn test_debouncer_empty() {
        let debouncer = Debouncer::new();
        assert!(!debouncer.is_ready());
        assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
    }

    #[test]
    fn test_debouncer_dedups_and_filters() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&make_event(vec!["/tmp/js/app.js", "/tmp/js/app.js"], modify_kind()));
        debouncer.add_event(&make_event(vec!["/tmp/js/.app.js.swp"], modify_kind()));
        debouncer.add_event(&make_event(vec!["/tmp/js/app.js~"], modify_kind()));
        debouncer.add_event(&make_event(vec!["/tmp/css/site.css"], metadata_kind()));

        assert_eq!(debouncer.changes.len(), 1);
        assert!(debouncer.last_event.is_some());
    }

    #[test]
    fn test_debouncer_ignores_own_output() {
        let mut written = WrittenFiles::new();
        written.notify_changed(Path::new("/tmp/res/generated/js/uber.js"));

        let mut debouncer = Debouncer::new();
        debouncer.add_event(&make_event(vec!["/tmp/res/generated/js/uber.js"], modify_kind()));
        debouncer.ignore_written(&written);
        // dropped retroactively
        assert!(debouncer.changes.is_empty());

        debouncer.add_event(&make_event(
            vec!["/tmp/res/generated/js", "/tmp/res/generated/js/uber.js"],
            modify_kind(),
        ));
        assert!(debouncer.changes.is_empty());

        debouncer.add_event(&make_event(vec!["/tmp/res/js/app.js"], modify_kind()));
        assert_eq!(debouncer.changes.len(), 1);
    }

    #[test]
    fn test_debouncer_ready_after_quiet_period() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&make_event(vec!["/tmp/js/app.js"], modify_kind()));
        assert!(debouncer.take_if_ready().is_none());

        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 50));
        let changes = debouncer.take_if_ready().unwrap();
        assert_eq!(changes, [PathBuf::from("/tmp/js/app.js")]);
        assert!(debouncer.changes.is_empty());
        assert!(!debouncer.is_ready());
    }

    #[test]
    fn test_cooldown_after_build() {
        let mut debouncer = Debouncer::new();
        debouncer.ignore_written(&WrittenFiles::new());
        debouncer.add_event(&make_event(vec!["/tmp/js/app.js"], modify_kind()));
        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 50));

        assert!(!debouncer.is_ready());
        assert!(debouncer.sleep_duration() > Duration::from_millis(1));
    }

    #[test]
    fn test_watch_roots_skip_nested() {
        let roots = watch_roots(&[Path::new("/tmp/app/src/main"), Path::new("/tmp/app/src/main/resources")]);
        assert_eq!(roots, [PathBuf::from("/tmp/app/src/main")]);

        let roots = watch_roots(&[Path::new("/tmp/app/res"), Path::new("/tmp/app")]);
        assert_eq!(roots, [PathBuf::from("/tmp/app")]);

        let roots = watch_roots(&[Path::new("/tmp/app/js"), Path::new("/tmp/app/css")]);
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn test_is_temp_file() {
        assert!(is_temp_file(Path::new("/a/.index.html.swp")));
        assert!(is_temp_file(Path::new("/a/app.js.bak")));
        assert!(is_temp_file(Path::new("/a/app.js~")));
        assert!(!is_temp_file(Path::new("/a/app.js")));
    }
}
