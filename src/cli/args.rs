//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Bundle the stylesheets and scripts an html page links into minified uber files
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: uberpack.toml)
    #[arg(short = 'C', long, global = true, default_value = "uberpack.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a commented default uberpack.toml
    #[command(visible_alias = "i")]
    Init {
        /// Print the config instead of writing it
        #[arg(long)]
        dry: bool,
    },

    /// Bundle once
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Bundle, then re-bundle whenever a source file changes
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

/// Shared arguments for Build and Watch
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Script source directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub scripts: Option<PathBuf>,

    /// Asset source directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub assets: Option<PathBuf>,

    /// Input html path inside the asset directory (e.g. /index.html)
    #[arg(long)]
    pub html: Option<String>,

    /// Record and print script warnings
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub warn: Option<bool>,

    /// Fail the run if any warning was recorded (implies --warn)
    #[arg(short = 'F', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub fail_on_warning: Option<bool>,

    /// Break minified output into lines of roughly this many columns
    #[arg(short = 'L', long)]
    pub max_line_length: Option<usize>,

    /// Keep local identifier names in scripts
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub no_mangle: Option<bool>,

    /// Keep every script statement terminated on its own line
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub preserve_semicolons: Option<bool>,

    /// Skip script compression passes, only strip whitespace and mangle
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub disable_optimizations: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }

    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch { .. })
    }

    /// Build arguments of `build` or `watch`.
    pub fn build_args(&self) -> Option<&BuildArgs> {
        match &self.command {
            Commands::Build { build_args } | Commands::Watch { build_args } => Some(build_args),
            Commands::Init { .. } => None,
        }
    }
}
