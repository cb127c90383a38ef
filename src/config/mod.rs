//! Bundler configuration from `uberpack.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [source] [output] [minify] [preprocess]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config file discovery
//! └── mod.rs         # BundlerConfig (this file)
//! ```
//!
//! Precedence: CLI flags, then the config file, then defaults. A missing
//! config file is not an error; defaults apply relative to the current
//! directory.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{MinifyConfig, OutputConfig, PreprocessConfig, SourceConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{BuildArgs, Cli},
    core::{AssetKind, BundleCategory},
    log,
    utils::path::{normalize_path, resolve_url_path},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing uberpack.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundlerConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root, the config file's directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub minify: MinifyConfig,

    #[serde(default)]
    pub preprocess: PreprocessConfig,
}

impl BundlerConfig {
    /// Load configuration for the parsed command line.
    ///
    /// Searches upward from cwd for the config file. `init` always targets
    /// cwd and skips validation, since the file does not exist yet.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let found = if cli.is_init() {
            None
        } else {
            find_config_file(&cwd, &cli.config)
        };

        let mut config = match &found {
            Some(path) => Self::from_path(path)?,
            None => {
                if !cli.is_init() {
                    log!("config"; "no {} found, using defaults", cli.config.display());
                }
                Self::default()
            }
        };

        config.config_path = found.unwrap_or_else(|| cwd.join(&cli.config));
        let root = config
            .config_path
            .parent()
            .map_or(cwd, Path::to_path_buf);
        config.finalize(&root, cli.build_args());

        if !cli.is_init() {
            config.validate()?;
        }
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Apply CLI overrides, then anchor relative directories at `root`.
    pub(crate) fn finalize(&mut self, root: &Path, args: Option<&BuildArgs>) {
        if let Some(args) = args {
            self.apply_build_args(args);
        }

        self.root = normalize_path(root);
        self.config_path = normalize_path(&self.config_path);
        let root = self.root.clone();
        self.source.normalize(&root);
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.source.scripts, args.scripts.as_ref());
        Self::update_option(&mut self.source.assets, args.assets.as_ref());
        Self::update_option(&mut self.source.html, args.html.as_ref());

        Self::update_option(&mut self.minify.warn, args.warn.as_ref());
        Self::update_option(&mut self.minify.fail_on_warning, args.fail_on_warning.as_ref());
        Self::update_option(&mut self.minify.no_mangle, args.no_mangle.as_ref());
        Self::update_option(
            &mut self.minify.preserve_semicolons,
            args.preserve_semicolons.as_ref(),
        );
        Self::update_option(
            &mut self.minify.disable_optimizations,
            args.disable_optimizations.as_ref(),
        );
        if let Some(max) = args.max_line_length {
            self.minify.max_line_length = Some(max);
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path resolution
    // ========================================================================

    /// Directory the references of `category` are read from.
    pub fn source_dir(&self, category: BundleCategory) -> &Path {
        match category.kind() {
            AssetKind::Style => &self.source.assets,
            AssetKind::Script => &self.source.scripts,
        }
    }

    /// File on disk for a site-absolute output path.
    pub fn output_path(&self, url_path: &str) -> PathBuf {
        resolve_url_path(&self.source.assets, url_path)
    }

    /// Project-relative form of `path`, for log lines.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.source.validate_field_status(&mut diag);
        self.output.validate_field_status(&mut diag);
        self.minify.validate_field_status(&mut diag);
        self.preprocess.validate_field_status(&mut diag);

        self.source.validate(&mut diag);
        self.output.validate(&mut diag);
        self.minify.validate(&mut diag);
        self.preprocess.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

/// Parse a config snippet, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> BundlerConfig {
    let (parsed, ignored) = BundlerConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
