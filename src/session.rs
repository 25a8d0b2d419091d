//! The test-run session.
//!
//! A [`Session`] owns everything one run mutates: the scope stack, the
//! output-context state of the compound assertion being declared, the
//! counters, and the message sink. Scopes are entered through closures
//! (`module`, `test`, and the assertion methods) which always close the scope
//! they opened, including when the closure returns an error.
//!
//! ```rust
//! use verity::session::Session;
//!
//! let mut session = Session::default();
//! session
//!     .module("math", |s| {
//!         s.test("adds", |s| {
//!             s.assert_equal(2i64, 2i64, None)?;
//!             Ok(())
//!         })
//!     })
//!     .unwrap();
//! let report = session.finish();
//! assert_eq!(report.counters.pass, 1);
//! ```

use std::mem;

use crate::channel::{Channel, NullSink, Severity, SharedSink};
use crate::config::RunConfig;
use crate::context::{self, Directive, OutputContext};
use crate::diagnostics::{Result, VerityError};
use crate::messages;
use crate::report::{Report, Reporter};
use crate::results::{AssertionKind, AssertionResult, ResultEngine};
use crate::scope::{resolve_description, ScopeKind, ScopeStack};
use crate::stats::{Counter, Outcome, RunCounters};
use crate::value::Value;

/// Captured blocks of the compound assertion currently being declared.
#[derive(Debug, Default)]
struct PendingOutput {
    output: Option<String>,
    expected: Option<(Directive, String)>,
    fault: Option<VerityError>,
}

pub struct Session {
    config: RunConfig,
    engine: ResultEngine,
    sink: SharedSink,
    stack: ScopeStack,
    context: OutputContext,
    counters: RunCounters,
    test_outcome: Option<Outcome>,
    pending: Vec<PendingOutput>,
    captures: Vec<String>,
    results: Vec<AssertionResult>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RunConfig::default(), SharedSink::new(NullSink))
    }
}

impl Session {
    pub fn new(config: RunConfig, sink: SharedSink) -> Self {
        Self::with_engine(config, sink, ResultEngine::default())
    }

    pub fn with_engine(config: RunConfig, sink: SharedSink, engine: ResultEngine) -> Self {
        Self {
            config,
            engine,
            sink,
            stack: ScopeStack::new(),
            context: OutputContext::new(),
            counters: RunCounters::new(),
            test_outcome: None,
            pending: Vec::new(),
            captures: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn stack(&self) -> &ScopeStack {
        &self.stack
    }

    pub fn output_context(&self) -> &OutputContext {
        &self.context
    }

    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    pub fn results(&self) -> &[AssertionResult] {
        &self.results
    }

    // ------------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------------

    pub fn module<T>(
        &mut self,
        label: &str,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.counters.increment(Counter::Modules);
        for line in messages::module_header(label) {
            self.comment(Severity::Info, &line);
        }
        self.scoped(ScopeKind::Module, label, body)
    }

    /// Runs one test. When the body returns, the test's combined assertion
    /// outcome is recorded, even if the body failed.
    pub fn test<T>(&mut self, label: &str, body: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.counters.increment(Counter::Tests);
        self.comment(Severity::Info, &messages::test_header(label));
        let outer = self.test_outcome.take();
        let result = self.scoped(ScopeKind::Test, label, body);
        let outcome = mem::replace(&mut self.test_outcome, outer);
        self.counters.record_test(outcome);
        result
    }

    fn scoped<T>(
        &mut self,
        kind: ScopeKind,
        label: &str,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.stack.push(kind, label);
        let result = body(self);
        let popped = self.stack.pop_expecting(kind);
        let value = result?;
        popped?;
        Ok(value)
    }

    // ------------------------------------------------------------------------
    // Simple assertions
    // ------------------------------------------------------------------------

    pub fn assert_equal(
        &mut self,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
        description: Option<&str>,
    ) -> Result<AssertionResult> {
        let (actual, expected) = (actual.into(), expected.into());
        self.run_assertion(description, |s| Ok(s.engine.evaluate(actual, expected, false)))
    }

    pub fn assert_unequal(
        &mut self,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
        description: Option<&str>,
    ) -> Result<AssertionResult> {
        let (actual, expected) = (actual.into(), expected.into());
        self.run_assertion(description, |s| Ok(s.engine.evaluate(actual, expected, true)))
    }

    pub fn assert_true(
        &mut self,
        value: impl Into<Value>,
        description: Option<&str>,
    ) -> Result<AssertionResult> {
        let value = value.into();
        self.run_assertion(description, |s| Ok(s.engine.evaluate_truthy(value, true)))
    }

    pub fn assert_false(
        &mut self,
        value: impl Into<Value>,
        description: Option<&str>,
    ) -> Result<AssertionResult> {
        let value = value.into();
        self.run_assertion(description, |s| Ok(s.engine.evaluate_truthy(value, false)))
    }

    // ------------------------------------------------------------------------
    // Compound output assertions
    // ------------------------------------------------------------------------

    /// Declares a compound assertion. The body must call [`Session::output`]
    /// once and one of [`Session::expect`] or [`Session::contains`] once.
    /// Malformed declarations produce a structural-error result; they are
    /// reported and counted as failures, not returned as `Err`.
    pub fn assert_output(
        &mut self,
        description: Option<&str>,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<AssertionResult> {
        self.run_assertion(description, |s| {
            if let Err(err) = s.declare(Directive::Assert) {
                return Ok(s.engine.structural_error(err.to_string()));
            }
            s.pending.push(PendingOutput::default());
            let body_result = body(s);
            let pending = s.pending.pop().unwrap_or_default();
            let finalized = context::validate(mem::take(&mut s.context), None);
            body_result?;

            let structure = match (pending.fault, finalized) {
                (Some(fault), _) | (None, Err(fault)) => Err(fault),
                (None, Ok(_)) => Ok((pending.output, pending.expected)),
            };
            match structure {
                Err(fault) => Ok(s.engine.structural_error(fault.to_string())),
                Ok((Some(output), Some((directive, expected)))) => {
                    Ok(s.settle_output(&output, directive, &expected))
                }
                // Finalization guarantees both blocks were captured.
                Ok(_) => Ok(s.engine.structural_error(
                    "each assert() must contain one output(), and one expect() or contains()",
                )),
            }
        })
    }

    /// The actual side of a compound assertion.
    pub fn output(&mut self, block: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        self.declare_block(Directive::Output, block)
    }

    /// The expected side of a compound assertion, compared in full.
    pub fn expect(&mut self, block: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        self.declare_block(Directive::Expect, block)
    }

    /// The expected side of a compound assertion, matched as a subset.
    pub fn contains(&mut self, block: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        self.declare_block(Directive::Contains, block)
    }

    /// Writes content. Inside an `output`/`expect`/`contains` block the text
    /// is captured for comparison; elsewhere it goes to the comments channel.
    pub fn emit(&mut self, text: &str) {
        match self.captures.last_mut() {
            Some(buffer) => {
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(text);
            }
            None => self.comment(Severity::Info, text),
        }
    }

    /// Replays a raw directive sequence through the structural validator and
    /// records the verdict as an assertion. Names are parsed as directives;
    /// the reset signal is appended automatically.
    pub fn assert_directives(
        &mut self,
        description: Option<&str>,
        directives: &[String],
    ) -> Result<AssertionResult> {
        self.run_assertion(description, |s| {
            let verdict = directives
                .iter()
                .map(|name| Some(name.as_str()))
                .chain(std::iter::once(None))
                .try_fold(OutputContext::new(), context::validate_named);
            Ok(match verdict {
                Ok(_) => s.engine.structure_verified(directives.len()),
                Err(err) => AssertionResult {
                    kind: AssertionKind::AssertDirectives,
                    ..s.engine.structural_error(err.to_string())
                },
            })
        })
    }

    fn declare_block(
        &mut self,
        directive: Directive,
        block: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        if let Err(err) = self.declare(directive) {
            match self.pending.last_mut() {
                Some(pending) => {
                    pending.fault.get_or_insert(err);
                }
                // Outside any assert(): nothing to attach the error to, so
                // it becomes an assertion of its own.
                None => {
                    self.run_assertion(None, |s| Ok(s.engine.structural_error(err.to_string())))?;
                }
            }
            return Ok(());
        }

        let text = self.capture(block)?;
        if let Some(pending) = self.pending.last_mut() {
            match directive {
                Directive::Output => pending.output = Some(text),
                Directive::Expect | Directive::Contains => {
                    pending.expected.get_or_insert((directive, text));
                }
                Directive::Assert => {}
            }
        }
        Ok(())
    }

    /// Feeds one directive to the validator. On error the context is reset
    /// and the error handed back for reporting.
    fn declare(&mut self, directive: Directive) -> Result<()> {
        match context::validate(mem::take(&mut self.context), Some(directive)) {
            Ok(next) => {
                self.context = next;
                Ok(())
            }
            Err(err) => {
                log::debug!(target: "verity", "structural error on {directive}: {err}");
                Err(err)
            }
        }
    }

    fn capture(&mut self, block: impl FnOnce(&mut Self) -> Result<()>) -> Result<String> {
        self.captures.push(String::new());
        let result = block(self);
        let text = self.captures.pop().unwrap_or_default();
        result.map(|()| text)
    }

    fn settle_output(&mut self, output: &str, directive: Directive, expected: &str) -> AssertionResult {
        if self.config.defers_output() {
            let closing = match directive {
                Directive::Contains => "CONTAINED",
                _ => "EXPECTED",
            };
            let description = self
                .stack
                .current(ScopeKind::Assert)
                .unwrap_or_default()
                .to_string();
            self.comment(Severity::Info, &format!("ASSERT: {description}"));
            self.comment(Severity::Info, "OUTPUT");
            self.comment(Severity::Info, output);
            self.comment(Severity::Info, "END_OUTPUT");
            self.comment(Severity::Info, closing);
            self.comment(Severity::Info, expected);
            self.comment(Severity::Info, &format!("END_{closing}"));
            self.comment(Severity::Info, "END_ASSERT");
        }
        match directive {
            Directive::Contains => self.engine.evaluate_contains(output, expected),
            _ => self.engine.evaluate_output(output, expected),
        }
    }

    // ------------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------------

    /// Push the assert scope, compute, record, pop. The description falls back
    /// to the enclosing test's label.
    fn run_assertion(
        &mut self,
        description: Option<&str>,
        compute: impl FnOnce(&mut Self) -> Result<AssertionResult>,
    ) -> Result<AssertionResult> {
        let description = resolve_description(&self.stack, description);
        let label = description.clone();
        self.scoped(ScopeKind::Assert, &label, |s| {
            let result = compute(s)?.with_description(description);
            s.record(&result);
            Ok(result)
        })
    }

    fn record(&mut self, result: &AssertionResult) {
        self.counters.increment(Counter::Assertions);
        let outcome = ResultEngine::classify(result, self.config.defers_output());

        if self.stack.current(ScopeKind::Test).is_some() {
            self.test_outcome = Some(Outcome::merge(self.test_outcome, outcome));
        } else {
            self.warn(&format!(
                "assertion \"{}\" ran outside of a test and is not counted in the results",
                result.description
            ));
        }

        match outcome {
            Outcome::Pass | Outcome::OutputToCss => {
                self.comment(Severity::Pass, &messages::pass_line(result));
            }
            Outcome::Fail => {
                for line in messages::failure_lines(result, &self.stack) {
                    self.comment(Severity::Fail, &line);
                    if self.config.terminal {
                        self.sink.emit(Channel::Debug, Severity::Fail, &line);
                    }
                }
            }
        }
        self.results.push(result.clone());
    }

    fn comment(&self, severity: Severity, text: &str) {
        self.sink.emit(Channel::Comments, severity, text);
    }

    fn warn(&self, text: &str) {
        log::warn!(target: "verity", "{}", text);
        self.sink.emit(Channel::Comments, Severity::Warning, text);
        if self.config.terminal {
            self.sink.emit(Channel::Debug, Severity::Warning, text);
        }
    }

    // ------------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------------

    /// Renders the summary onto the channels and returns the report. A fatal
    /// report still returns normally; use [`Report::into_result`] to stop.
    pub fn finish(&mut self) -> Report {
        if !self.stack.is_empty() {
            self.warn(&format!("scopes left open at the end of the run: {}", self.stack.path()));
        }
        if !self.context.is_empty() {
            self.warn("an assert() was left unfinished at the end of the run");
            self.context = OutputContext::new();
        }

        let report = Reporter::new(self.config.verbose)
            .finalize(&self.counters, self.config.fail_on_error);
        for line in report.text.lines() {
            self.comment(Severity::Info, line);
            if self.config.terminal {
                self.sink.emit(Channel::Debug, Severity::Info, line);
            }
        }
        for warning in &report.warnings {
            self.warn(warning);
        }
        if let Some(failure) = report.failure() {
            log::error!(target: "verity", "{failure}");
            self.sink.emit(Channel::Debug, Severity::Fail, &failure.to_string());
        }
        report
    }
}
