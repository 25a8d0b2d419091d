//! End-of-run summary.
//!
//! The reporter reads a snapshot of [`RunCounters`], renders it, checks
//! that the numbers are self-consistent, and decides whether failures
//! should stop the host.

use serde::Serialize;

use crate::diagnostics::{Result, VerityError};
use crate::stats::RunCounters;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub text: String,
    pub fatal: bool,
    pub counters: RunCounters,
    /// Non-fatal diagnostics, such as counters that don't add up.
    pub warnings: Vec<String>,
}

impl Report {
    /// The fatal failure, if this report carries one.
    pub fn failure(&self) -> Option<VerityError> {
        self.fatal.then_some(VerityError::TestsFailed {
            failed: self.counters.fail,
        })
    }

    pub fn into_result(self) -> Result<Report> {
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    pub verbose: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self { verbose: true }
    }
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn summarize(&self, counters: &RunCounters) -> String {
        if self.verbose {
            multi_line(counters)
        } else {
            single_line(counters)
        }
    }

    pub fn finalize(&self, counters: &RunCounters, fail_on_error: bool) -> Report {
        let warnings = check_consistency(counters)
            .map(|err| err.to_string())
            .into_iter()
            .collect();
        Report {
            text: self.summarize(counters),
            fatal: fail_on_error && counters.fail > 0,
            counters: *counters,
            warnings,
        }
    }
}

/// `run` must equal the number of declared tests and the sum of the outcome
/// buckets.
pub fn check_consistency(counters: &RunCounters) -> Option<VerityError> {
    let mut problems = Vec::new();
    if counters.run != counters.tests {
        problems.push(format!(
            "{} run but {} declared",
            counted(counters.run, "test"),
            counters.tests
        ));
    }
    if counters.run != counters.settled() {
        problems.push(format!(
            "{} run but {} passed, {} failed and {} output to CSS",
            counted(counters.run, "test"),
            counters.pass,
            counters.fail,
            counters.output_to_css
        ));
    }
    (!problems.is_empty()).then(|| VerityError::Inconsistent {
        message: problems.join("; "),
    })
}

fn counted(count: u64, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn multi_line(c: &RunCounters) -> String {
    let lines = [
        "# SUMMARY ----------".to_string(),
        format!("{}:", counted(c.run, "Test")),
        format!("  - {} Passed", c.pass),
        format!("  - {} Failed", c.fail),
        format!("  - {} Output to CSS", c.output_to_css),
        "Stats:".to_string(),
        format!("  - {}", counted(c.modules, "Module")),
        format!("  - {}", counted(c.tests, "Test")),
        format!("  - {}", counted(c.assertions, "Assertion")),
        "--------------------".to_string(),
    ];
    lines.join("\n")
}

fn single_line(c: &RunCounters) -> String {
    format!(
        "{}: {} Passed, {} Failed, {} Output to CSS ({}, {}, {})",
        counted(c.run, "Test"),
        c.pass,
        c.fail,
        c.output_to_css,
        counted(c.modules, "Module"),
        counted(c.tests, "Test"),
        counted(c.assertions, "Assertion"),
    )
}
