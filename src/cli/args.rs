//! Command-line arguments for the `verity` binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::ColorMode;

#[derive(Debug, Parser)]
#[command(
    name = "verity",
    version,
    about = "Run nested module/test/assertion suites and report the results."
)]
pub struct VerityArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a suite and print the per-assertion report and summary.
    Run {
        /// The YAML or JSON suite file.
        #[arg(required = true)]
        suite: PathBuf,
        #[command(flatten)]
        options: RunOptions,
    },
    /// Check that every compound assertion in a suite is well formed.
    Check {
        /// The YAML or JSON suite file.
        #[arg(required = true)]
        suite: PathBuf,
    },
}

#[derive(Debug, Default, Args)]
pub struct RunOptions {
    /// Load run settings from a YAML or JSON file before applying flags.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Exit with an error when any test fails.
    #[arg(long)]
    pub fail_on_error: bool,
    /// Don't mirror failures and the summary onto stderr.
    #[arg(long)]
    pub no_terminal: bool,
    /// Print a one-line summary.
    #[arg(long, short)]
    pub quiet: bool,
    /// Emit compound output blocks for an external diff instead of comparing.
    #[arg(long)]
    pub emit_output: bool,
    /// Print the final report as JSON instead of the text summary.
    #[arg(long)]
    pub json: bool,
    #[arg(long, value_enum)]
    pub color: Option<ColorArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

impl From<ColorArg> for ColorMode {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => ColorMode::Auto,
            ColorArg::Always => ColorMode::Always,
            ColorArg::Never => ColorMode::Never,
        }
    }
}
