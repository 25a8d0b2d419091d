//! Verity error handling.
//!
//! Every failure the engine can surface is a [`VerityError`]. Structural and
//! consistency errors are reported and the run keeps going; only
//! [`VerityError::TestsFailed`] is meant to stop the host. Errors implement
//! `miette::Diagnostic` so the CLI can render them with codes and help text.

use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::context::Directive;
use crate::scope::ScopeKind;

/// Shared `Result` alias for the crate.
pub type Result<T> = std::result::Result<T, VerityError>;

/// Type-safe error classification, mirroring the [`VerityError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Malformed compound assertion or scope misuse
    Structure,
    /// End-of-run counters disagree
    Consistency,
    /// Failing tests with `fail_on_error` set
    Failure,
    /// Configuration, suite loading and I/O
    Input,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Structure => "Structure",
            ErrorType::Consistency => "Consistency",
            ErrorType::Failure => "Failure",
            ErrorType::Input => "Input",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum VerityError {
    /// A compound assertion was declared in an invalid order or shape.
    #[error("{message}")]
    Structural {
        directive: Option<Directive>,
        message: String,
    },
    #[error("unknown output context `{name}`: expected one of assert, output, expect, contains")]
    UnknownContext { name: String },
    #[error("cannot leave a scope: the scope stack is empty")]
    Underflow { expected: Option<ScopeKind> },
    #[error("cannot leave a {expected} scope: the innermost scope is a {found}")]
    ScopeMismatch { expected: ScopeKind, found: ScopeKind },
    #[error("the results don't add up: {message}")]
    Inconsistent { message: String },
    #[error("{failed} {} failed", tests_noun(.failed))]
    TestsFailed { failed: u64 },
    #[error("invalid configuration: {message}")]
    Config { message: String },
    #[error("invalid suite: {message}")]
    Suite { message: String },
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn tests_noun<C: Borrow<u64>>(count: C) -> &'static str {
    if *count.borrow() == 1 {
        "test"
    } else {
        "tests"
    }
}

impl VerityError {
    pub fn structural(directive: Option<Directive>, message: impl Into<String>) -> Self {
        VerityError::Structural {
            directive,
            message: message.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            VerityError::Structural { .. }
            | VerityError::UnknownContext { .. }
            | VerityError::Underflow { .. }
            | VerityError::ScopeMismatch { .. } => ErrorType::Structure,
            VerityError::Inconsistent { .. } => ErrorType::Consistency,
            VerityError::TestsFailed { .. } => ErrorType::Failure,
            VerityError::Config { .. } | VerityError::Suite { .. } | VerityError::Io { .. } => {
                ErrorType::Input
            }
        }
    }

    /// True for errors that should stop the host rather than be logged.
    pub fn is_fatal(&self) -> bool {
        matches!(self, VerityError::TestsFailed { .. })
    }

    const fn code_suffix(&self) -> &'static str {
        match self {
            VerityError::Structural { .. } => "structure",
            VerityError::UnknownContext { .. } => "structure::unknown",
            VerityError::Underflow { .. } => "scope::underflow",
            VerityError::ScopeMismatch { .. } => "scope::mismatch",
            VerityError::Inconsistent { .. } => "report::consistency",
            VerityError::TestsFailed { .. } => "report::failed",
            VerityError::Config { .. } => "config",
            VerityError::Suite { .. } => "suite",
            VerityError::Io { .. } => "io",
        }
    }
}

impl Diagnostic for VerityError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("verity::{}", self.code_suffix())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self {
            VerityError::Structural { .. } => {
                "wrap output() together with one expect() or contains() inside a single assert()"
            }
            VerityError::Inconsistent { .. } => {
                "a test was probably declared without running any assertion"
            }
            VerityError::TestsFailed { .. } => {
                "disable fail_on_error to report failures without stopping the run"
            }
            VerityError::Underflow { .. } | VerityError::ScopeMismatch { .. } => {
                "scopes must be closed in the reverse order they were opened"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}
