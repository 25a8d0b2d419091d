//! Text rendered onto the `comments` channel as scopes open and assertions
//! complete.

use difference::{Changeset, Difference};

use crate::results::{AssertionResult, Status};
use crate::scope::{ScopeKind, ScopeStack};
use crate::value::Value;

pub const PASS_MARK: &str = "✔";
pub const FAIL_MARK: &str = "✖";

pub fn module_header(label: &str) -> Vec<String> {
    let title = format!("# Module: {label}");
    let rule = "-".repeat(title.chars().count());
    vec![title, rule]
}

pub fn test_header(label: &str) -> String {
    format!("Test: {label}")
}

pub fn pass_line(result: &AssertionResult) -> String {
    format!("  {PASS_MARK} {}", result.description)
}

/// Failure block for one assertion: a headline, the compared values, and
/// where the assertion sits in the scope tree.
pub fn failure_lines(result: &AssertionResult, stack: &ScopeStack) -> Vec<String> {
    let label = match result.status {
        Status::StructuralError => "ERROR",
        _ => "FAILED",
    };
    let mut lines = vec![format!(
        "  {FAIL_MARK} {label}: [{}] {}",
        result.kind, result.description
    )];

    if result.status != Status::StructuralError {
        lines.push(format!("    - Output: {}", describe_value(&result.actual)));
        let expected_label = if result.unequal_expected {
            "Expected unequal to"
        } else {
            "Expected"
        };
        lines.push(format!(
            "    - {expected_label}: {}",
            describe_value(&result.expected)
        ));
    }
    if let Some(details) = &result.details {
        lines.push(format!("    - Details: {details}"));
    }
    if let (Value::String(actual), Value::String(expected), Status::Fail) =
        (&result.actual, &result.expected, result.status)
    {
        if actual.contains('\n') || expected.contains('\n') {
            lines.push("    - Diff:".to_string());
            lines.extend(diff_lines(expected, actual));
        }
    }
    if let Some(module) = stack.current(ScopeKind::Module) {
        lines.push(format!("    - Module: {module}"));
    }
    if let Some(test) = stack.current(ScopeKind::Test) {
        lines.push(format!("    - Test: {test}"));
    }
    if !stack.is_empty() {
        lines.push(format!("    - Path: {}", stack.path()));
    }
    lines
}

/// Expected-vs-actual line diff: `-` lines are expected, `+` lines actual.
pub fn diff_lines(expected: &str, actual: &str) -> Vec<String> {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut lines = Vec::new();
    for diff in &changeset.diffs {
        let (prefix, chunk) = match diff {
            Difference::Same(chunk) => (" ", chunk),
            Difference::Rem(chunk) => ("-", chunk),
            Difference::Add(chunk) => ("+", chunk),
        };
        for line in chunk.lines() {
            lines.push(format!("      {prefix} {line}"));
        }
    }
    lines
}

fn describe_value(value: &Value) -> String {
    format!("[{}] {}", value.type_name().to_lowercase(), value.inspect())
}
