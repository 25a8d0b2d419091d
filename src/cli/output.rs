//! Handles all user-facing output for the CLI.
//!
//! The `comments` channel goes to stdout and the `debug` channel to stderr,
//! coloured by severity when the stream is a terminal.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::channel::{Channel, MessageSink, Severity};
use crate::config::ColorMode;
use crate::report::Report;
use crate::suite::StructureIssue;

// ============================================================================
// TERMINAL SINK
// ============================================================================

/// Writes each channel to its own standard stream.
pub struct TerminalSink {
    comments: Option<StandardStream>,
    debug: StandardStream,
}

impl TerminalSink {
    pub fn new(color: ColorMode) -> Self {
        Self {
            comments: Some(StandardStream::stdout(color_choice(color, atty::Stream::Stdout))),
            debug: StandardStream::stderr(color_choice(color, atty::Stream::Stderr)),
        }
    }

    /// Drops the comments channel, leaving stdout free for machine output.
    pub fn without_comments(mut self) -> Self {
        self.comments = None;
        self
    }
}

impl MessageSink for TerminalSink {
    fn emit(&mut self, channel: Channel, severity: Severity, text: &str) {
        let stream = match channel {
            Channel::Comments => match self.comments.as_mut() {
                Some(stream) => stream,
                None => return,
            },
            Channel::Debug => &mut self.debug,
        };
        // A closed pipe shouldn't abort the run.
        let _ = write_line(stream, severity, text);
    }
}

fn write_line(stream: &mut StandardStream, severity: Severity, text: &str) -> io::Result<()> {
    match severity_color(severity) {
        Some(color) => {
            stream.set_color(ColorSpec::new().set_fg(Some(color)))?;
            writeln!(stream, "{text}")?;
            stream.reset()
        }
        None => writeln!(stream, "{text}"),
    }
}

fn severity_color(severity: Severity) -> Option<Color> {
    match severity {
        Severity::Info => None,
        Severity::Pass => Some(Color::Green),
        Severity::Fail => Some(Color::Red),
        Severity::Warning => Some(Color::Yellow),
    }
}

pub fn color_choice(mode: ColorMode, stream: atty::Stream) -> ColorChoice {
    match mode {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto => {
            if atty::is(stream) {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            }
        }
    }
}

// ============================================================================
// REPORT OUTPUT
// ============================================================================

pub fn print_json(report: &Report) -> io::Result<()> {
    let text = serde_json::to_string_pretty(report).map_err(io::Error::from)?;
    println!("{text}");
    Ok(())
}

/// Prints the result of `verity check`.
pub fn print_issues(issues: &[StructureIssue], checked: usize, color: ColorMode) {
    let mut stdout = StandardStream::stdout(color_choice(color, atty::Stream::Stdout));
    if issues.is_empty() {
        let _ = write_line(
            &mut stdout,
            Severity::Pass,
            &format!("{checked} assertions checked, all well formed"),
        );
        return;
    }
    for issue in issues {
        let _ = write_line(&mut stdout, Severity::Fail, &format!("✖ {}", issue.path));
        let _ = write_line(&mut stdout, Severity::Info, &format!("    {}", issue.message));
    }
    let _ = write_line(
        &mut stdout,
        Severity::Fail,
        &format!("{} of {checked} assertions are malformed", issues.len()),
    );
}
