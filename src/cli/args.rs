//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AccessibilityLevel;

/// EPUB language server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: epub-lsp.toml in the workspace root)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Mirror log output into a file
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Serve over stdin/stdout (the default)
    #[arg(long)]
    pub stdio: bool,

    /// subcommands; none starts the language server
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate an EPUB source tree and print diagnostics
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        args: CheckArgs,
    },
}

/// Check command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Directory or file to check
    #[arg(value_name = "PATH", default_value = ".", value_hint = clap::ValueHint::AnyPath)]
    pub path: PathBuf,

    /// Severity of accessibility findings (error, warning, ignore)
    #[arg(long, value_parser = parse_level)]
    pub accessibility: Option<AccessibilityLevel>,

    /// Report errors without failing
    #[arg(long, short = 'w')]
    pub warn_only: bool,
}

fn parse_level(value: &str) -> Result<AccessibilityLevel, String> {
    AccessibilityLevel::from_option(value)
        .ok_or_else(|| format!("expected `error`, `warning` or `ignore`, got `{value}`"))
}
