//! Config file generation.

use anyhow::{Context, Result, bail};
use std::fs;

use crate::config::{BundlerConfig, MinifyConfig, OutputConfig, PreprocessConfig, SourceConfig};
use crate::log;

/// Generate uberpack.toml content with comments
pub fn generate_config_template() -> String {
    let mut out = format!(
        "# uberpack configuration file (v{})\n\n",
        env!("CARGO_PKG_VERSION")
    );

    out.push_str(&SourceConfig::template_with_header());
    out.push('\n');
    out.push_str(&OutputConfig::template_with_header());
    out.push('\n');
    out.push_str(&MinifyConfig::template_with_header());
    out.push('\n');
    out.push_str(&PreprocessConfig::template_with_header());

    out
}

/// `init` command entry point. With `dry_run` the template is only printed.
pub fn init(config: &BundlerConfig, dry_run: bool) -> Result<()> {
    let content = generate_config_template();
    if dry_run {
        print!("{content}");
        return Ok(());
    }

    let path = &config.config_path;
    if path.exists() {
        bail!("'{}' already exists", path.display());
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write config file '{}'", path.display()))?;

    log!("init"; "wrote {}", config.root_relative(path).display());
    Ok(())
}
