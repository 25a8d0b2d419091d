//! Running totals for one report cycle.
//!
//! Counters only ever go up. [`RunCounters`] holds per-test outcomes
//! (`run`, `pass`, `fail`, `output_to_css`) alongside the declaration stats
//! (`modules`, `tests`, `assertions`).

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    Run,
    Pass,
    Fail,
    OutputToCss,
    Modules,
    Tests,
    Assertions,
}

impl Counter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::Run => "run",
            Counter::Pass => "pass",
            Counter::Fail => "fail",
            Counter::OutputToCss => "output-to-css",
            Counter::Modules => "modules",
            Counter::Tests => "tests",
            Counter::Assertions => "assertions",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The outcome a finished test contributes to the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Pass,
    OutputToCss,
    Fail,
}

impl Outcome {
    pub fn counter(&self) -> Counter {
        match self {
            Outcome::Pass => Counter::Pass,
            Outcome::OutputToCss => Counter::OutputToCss,
            Outcome::Fail => Counter::Fail,
        }
    }

    /// Folds a new assertion outcome into a test's running outcome. A failure
    /// sticks; deferred output outranks a plain pass.
    pub fn merge(current: Option<Outcome>, next: Outcome) -> Outcome {
        current.map_or(next, |current| current.max(next))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunCounters {
    pub run: u64,
    pub pass: u64,
    pub fail: u64,
    pub output_to_css: u64,
    pub modules: u64,
    pub tests: u64,
    pub assertions: u64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, counter: Counter) {
        *self.slot(counter) += 1;
    }

    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Run => self.run,
            Counter::Pass => self.pass,
            Counter::Fail => self.fail,
            Counter::OutputToCss => self.output_to_css,
            Counter::Modules => self.modules,
            Counter::Tests => self.tests,
            Counter::Assertions => self.assertions,
        }
    }

    /// Records a finished test: `run` always, plus its outcome when at least
    /// one assertion ran.
    pub fn record_test(&mut self, outcome: Option<Outcome>) {
        self.increment(Counter::Run);
        if let Some(outcome) = outcome {
            self.increment(outcome.counter());
        }
    }

    /// Sum of the outcome buckets.
    pub fn settled(&self) -> u64 {
        self.pass + self.fail + self.output_to_css
    }

    fn slot(&mut self, counter: Counter) -> &mut u64 {
        match counter {
            Counter::Run => &mut self.run,
            Counter::Pass => &mut self.pass,
            Counter::Fail => &mut self.fail,
            Counter::OutputToCss => &mut self.output_to_css,
            Counter::Modules => &mut self.modules,
            Counter::Tests => &mut self.tests,
            Counter::Assertions => &mut self.assertions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_dominates_merge() {
        assert_eq!(Outcome::merge(None, Outcome::Pass), Outcome::Pass);
        assert_eq!(Outcome::merge(Some(Outcome::Pass), Outcome::OutputToCss), Outcome::OutputToCss);
        assert_eq!(Outcome::merge(Some(Outcome::Fail), Outcome::Pass), Outcome::Fail);
        assert_eq!(Outcome::merge(Some(Outcome::OutputToCss), Outcome::Fail), Outcome::Fail);
    }

    #[test]
    fn record_test_without_assertions_only_counts_run() {
        let mut counters = RunCounters::new();
        counters.record_test(None);
        counters.record_test(Some(Outcome::Fail));
        assert_eq!(counters.run, 2);
        assert_eq!(counters.fail, 1);
        assert_eq!(counters.settled(), 1);
    }

    #[test]
    fn increment_and_get_agree() {
        let mut counters = RunCounters::new();
        for counter in [Counter::Modules, Counter::Tests, Counter::Tests, Counter::Assertions] {
            counters.increment(counter);
        }
        assert_eq!(counters.get(Counter::Modules), 1);
        assert_eq!(counters.get(Counter::Tests), 2);
        assert_eq!(counters.get(Counter::Assertions), 1);
        assert_eq!(counters.get(Counter::Run), 0);
    }

    #[test]
    fn serializes_with_kebab_keys() {
        let json = serde_json::to_string(&RunCounters::new()).unwrap();
        assert!(json.contains("\"output-to-css\":0"));
    }
}
