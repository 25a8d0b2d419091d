//! The Verity command-line interface.
//!
//! Loads a suite, runs it through a [`Session`] wired to the terminal, and
//! turns a fatal report into a non-zero exit.

use std::path::Path;
use std::process;

use clap::Parser;

use crate::channel::SharedSink;
use crate::cli::args::{Command, RunOptions, VerityArgs};
use crate::cli::output::TerminalSink;
use crate::config::{OutputMode, RunConfig};
use crate::diagnostics::{Result, VerityError};
use crate::session::Session;
use crate::suite::Suite;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = VerityArgs::parse();

    let result = match args.command {
        Command::Run { suite, options } => run_suite(&suite, &options),
        Command::Check { suite } => check_suite(&suite),
    };

    if let Err(e) = result {
        print_error(e);
        process::exit(1);
    }
}

fn run_suite(path: &Path, options: &RunOptions) -> Result<()> {
    let config = resolve_config(options)?;
    let suite = Suite::from_file(path)?;

    let mut sink = TerminalSink::new(config.color);
    if options.json {
        sink = sink.without_comments();
    }
    let mut session = Session::new(config, SharedSink::new(sink));
    suite.run(&mut session)?;
    let report = session.finish();

    if options.json {
        output::print_json(&report).map_err(|source| VerityError::Io {
            path: "<stdout>".into(),
            source,
        })?;
    }
    report.into_result().map(|_| ())
}

fn check_suite(path: &Path) -> Result<()> {
    let suite = Suite::from_file(path)?;
    let issues = suite.check();
    output::print_issues(&issues, suite.assertion_count(), RunConfig::default().color);
    match issues.len() {
        0 => Ok(()),
        n => Err(VerityError::structural(
            None,
            format!(
                "{n} compound {} malformed",
                if n == 1 { "assertion is" } else { "assertions are" }
            ),
        )),
    }
}

/// File settings first, then flags on top.
fn resolve_config(options: &RunOptions) -> Result<RunConfig> {
    let mut config = match &options.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    if options.fail_on_error {
        config.fail_on_error = true;
    }
    if options.no_terminal {
        config.terminal = false;
    }
    if options.quiet {
        config.verbose = false;
    }
    if options.emit_output {
        config.output_mode = OutputMode::Emit;
    }
    if let Some(color) = options.color {
        config.color = color.into();
    }
    Ok(config)
}

/// Prints a VerityError with full miette diagnostics.
pub fn print_error(error: VerityError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
