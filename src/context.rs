//! Structural validation of compound output assertions.
//!
//! A compound assertion is one `assert()` wrapper holding exactly one
//! `output()` plus exactly one `expect()` or `contains()`. Each directive is
//! fed to [`validate`] as it is declared; the wrapper closes by feeding the
//! reset signal (`None`), which checks the collected shape and yields an
//! empty context again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Result, VerityError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directive {
    Assert,
    Output,
    Expect,
    Contains,
}

impl Directive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Directive::Assert => "assert",
            Directive::Output => "output",
            Directive::Expect => "expect",
            Directive::Contains => "contains",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.as_str())
    }
}

impl FromStr for Directive {
    type Err = VerityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_end_matches("()") {
            "assert" => Ok(Directive::Assert),
            "output" => Ok(Directive::Output),
            "expect" => Ok(Directive::Expect),
            "contains" => Ok(Directive::Contains),
            other => Err(VerityError::UnknownContext {
                name: other.to_string(),
            }),
        }
    }
}

/// Directives declared so far inside the current compound assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputContext {
    declared: Vec<Directive>,
}

impl OutputContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    pub fn contains(&self, directive: Directive) -> bool {
        self.declared.contains(&directive)
    }

    pub fn declared(&self) -> &[Directive] {
        &self.declared
    }
}

/// Advances `state` by one directive, or finalizes it when `directive` is
/// `None`.
pub fn validate(mut state: OutputContext, directive: Option<Directive>) -> Result<OutputContext> {
    let Some(directive) = directive else {
        return finalize(state);
    };

    if state.contains(directive) {
        let message = match directive {
            Directive::Assert => "assert() cannot contain another assert()".to_string(),
            other => format!("{other} must only be used once per assert()"),
        };
        return Err(VerityError::structural(Some(directive), message));
    }

    if directive != Directive::Assert && !state.contains(Directive::Assert) {
        return Err(VerityError::structural(
            Some(directive),
            format!("{directive} must be used inside an assert(): assert() wrapper is required"),
        ));
    }

    state.declared.push(directive);
    Ok(state)
}

/// Parses a textual directive name and validates it. `None` is the reset
/// signal.
pub fn validate_named(state: OutputContext, name: Option<&str>) -> Result<OutputContext> {
    let directive = name.map(str::parse::<Directive>).transpose()?;
    validate(state, directive)
}

fn finalize(state: OutputContext) -> Result<OutputContext> {
    let has_expect = state.contains(Directive::Expect);
    let has_contains = state.contains(Directive::Contains);
    let complete =
        state.declared.len() == 3 && state.contains(Directive::Output) && (has_expect ^ has_contains);
    if !complete {
        return Err(VerityError::structural(
            None,
            "each assert() must contain one output(), and one expect() or contains()",
        ));
    }
    Ok(OutputContext::new())
}
