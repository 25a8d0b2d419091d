//! Turning comparisons into assertion results.

use std::fmt;

use serde::Serialize;

use crate::stats::Outcome;
use crate::value::Value;

/// The equality primitive assertions are checked with.
pub trait Equality {
    fn equals(&self, actual: &Value, expected: &Value) -> bool;
}

/// Deep structural equality over [`Value`].
///
/// Numbers compare as `f64`, so `NaN` never equals anything, itself
/// included.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralEquality;

impl Equality for StructuralEquality {
    fn equals(&self, actual: &Value, expected: &Value) -> bool {
        actual == expected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pass,
    Fail,
    StructuralError,
}

/// Which assertion produced a result; used in failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssertionKind {
    AssertTrue,
    AssertFalse,
    AssertEqual,
    AssertUnequal,
    AssertOutput,
    AssertDirectives,
}

impl AssertionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssertionKind::AssertTrue => "assert-true",
            AssertionKind::AssertFalse => "assert-false",
            AssertionKind::AssertEqual => "assert-equal",
            AssertionKind::AssertUnequal => "assert-unequal",
            AssertionKind::AssertOutput => "assert",
            AssertionKind::AssertDirectives => "assert-directives",
        }
    }
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssertionResult {
    pub kind: AssertionKind,
    pub status: Status,
    pub description: String,
    pub actual: Value,
    pub expected: Value,
    pub unequal_expected: bool,
    /// Extra context for failures, such as a structural error message.
    pub details: Option<String>,
}

impl AssertionResult {
    pub fn passed(&self) -> bool {
        self.status == Status::Pass
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Computes pass/fail outcomes with a pluggable equality primitive.
pub struct ResultEngine {
    equality: Box<dyn Equality>,
}

impl Default for ResultEngine {
    fn default() -> Self {
        Self::new(StructuralEquality)
    }
}

impl ResultEngine {
    pub fn new(equality: impl Equality + 'static) -> Self {
        Self {
            equality: Box::new(equality),
        }
    }

    /// Compares `actual` with `expected`. With `unequal_expected` the
    /// assertion passes only when the two differ.
    pub fn evaluate(&self, actual: Value, expected: Value, unequal_expected: bool) -> AssertionResult {
        let equal = self.equality.equals(&actual, &expected);
        let kind = if unequal_expected {
            AssertionKind::AssertUnequal
        } else {
            AssertionKind::AssertEqual
        };
        let status = if equal == unequal_expected {
            Status::Fail
        } else {
            Status::Pass
        };
        let details = (status == Status::Fail && !equal)
            .then(|| type_hint(&actual, &expected))
            .flatten();
        AssertionResult {
            kind,
            status,
            description: String::new(),
            actual,
            expected,
            unequal_expected,
            details,
        }
    }

    /// Truthiness check behind `assert_true` (`expected = true`) and
    /// `assert_false` (`expected = false`).
    pub fn evaluate_truthy(&self, value: Value, expected: bool) -> AssertionResult {
        let truthy = Self::is_truthy(&value);
        AssertionResult {
            kind: if expected {
                AssertionKind::AssertTrue
            } else {
                AssertionKind::AssertFalse
            },
            status: if truthy == expected {
                Status::Pass
            } else {
                Status::Fail
            },
            description: String::new(),
            actual: value,
            expected: Value::Bool(expected),
            unequal_expected: false,
            details: None,
        }
    }

    pub fn is_truthy(value: &Value) -> bool {
        value.is_truthy()
    }

    /// Compares two captured output blocks after normalizing whitespace.
    pub fn evaluate_output(&self, actual: &str, expected: &str) -> AssertionResult {
        let actual = normalize_output(actual);
        let expected = normalize_output(expected);
        let status = if actual == expected {
            Status::Pass
        } else {
            Status::Fail
        };
        Self::output_result(status, actual, expected)
    }

    /// Passes when every non-blank line of `expected` appears among the lines
    /// of `actual`, in the same order. An empty `expected` block fails.
    pub fn evaluate_contains(&self, actual: &str, expected: &str) -> AssertionResult {
        let actual = normalize_output(actual);
        let expected = normalize_output(expected);
        if expected.is_empty() {
            return Self::output_result(Status::Fail, actual, expected)
                .with_details("contains() block is empty: nothing to look for");
        }
        let mut haystack = actual.lines().map(str::trim);
        let found = expected
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .all(|needle| haystack.any(|line| line == needle));
        let status = if found { Status::Pass } else { Status::Fail };
        Self::output_result(status, actual, expected)
    }

    /// Result for a compound assertion whose declaration was malformed.
    pub fn structural_error(&self, message: impl Into<String>) -> AssertionResult {
        AssertionResult {
            kind: AssertionKind::AssertOutput,
            status: Status::StructuralError,
            description: String::new(),
            actual: Value::Nil,
            expected: Value::Nil,
            unequal_expected: false,
            details: Some(message.into()),
        }
    }

    /// Result for a directive sequence that passed structural validation.
    pub fn structure_verified(&self, directives: usize) -> AssertionResult {
        AssertionResult {
            kind: AssertionKind::AssertDirectives,
            status: Status::Pass,
            description: String::new(),
            actual: Value::Number(directives as f64),
            expected: Value::Number(directives as f64),
            unequal_expected: false,
            details: None,
        }
    }

    /// Maps a result onto the outcome bucket it feeds. Deferred compound
    /// assertions report `OutputToCss` whatever their comparison says.
    pub fn classify(result: &AssertionResult, deferred: bool) -> Outcome {
        match result.status {
            Status::StructuralError => Outcome::Fail,
            _ if deferred && result.kind == AssertionKind::AssertOutput => Outcome::OutputToCss,
            Status::Pass => Outcome::Pass,
            Status::Fail => Outcome::Fail,
        }
    }

    fn output_result(status: Status, actual: String, expected: String) -> AssertionResult {
        AssertionResult {
            kind: AssertionKind::AssertOutput,
            status,
            description: String::new(),
            actual: Value::String(actual),
            expected: Value::String(expected),
            unequal_expected: false,
            details: None,
        }
    }
}

/// Trims trailing whitespace on every line and drops surrounding blank lines.
pub fn normalize_output(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|line| !line.is_empty());
    let end = lines.iter().rposition(|line| !line.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

// Values that print the same but differ in type get a hint, e.g. "1" vs 1.
fn type_hint(actual: &Value, expected: &Value) -> Option<String> {
    (actual.to_string() == expected.to_string() && actual.type_name() != expected.type_name())
        .then(|| {
            format!(
                "types differ: output is {}, expected {}",
                actual.type_name(),
                expected.type_name()
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ResultEngine {
        ResultEngine::default()
    }

    #[test]
    fn equality_and_inversion() {
        let e = engine();
        assert_eq!(e.evaluate(5i64.into(), 5i64.into(), false).status, Status::Pass);
        assert_eq!(e.evaluate(5i64.into(), 6i64.into(), false).status, Status::Fail);
        assert_eq!(e.evaluate(5i64.into(), 6i64.into(), true).status, Status::Pass);
        assert_eq!(e.evaluate(5i64.into(), 5i64.into(), true).status, Status::Fail);
    }

    #[test]
    fn deep_equality_over_lists() {
        let a = Value::List(vec![1i64.into(), Value::List(vec!["x".into()])]);
        let b = Value::List(vec![1i64.into(), Value::List(vec!["x".into()])]);
        assert!(engine().evaluate(a, b, false).passed());
    }

    #[test]
    fn same_rendering_different_type_gets_hint() {
        let result = engine().evaluate("1".into(), 1i64.into(), false);
        assert_eq!(result.status, Status::Fail);
        assert_eq!(
            result.details.as_deref(),
            Some("types differ: output is String, expected Number")
        );
    }

    #[test]
    fn truthy_checks_use_override() {
        let e = engine();
        assert!(!e.evaluate_truthy("".into(), true).passed());
        assert!(!e.evaluate_truthy(Value::List(vec![]), true).passed());
        assert!(e.evaluate_truthy(Value::Number(0.0), true).passed());
        assert!(e.evaluate_truthy("non-empty".into(), true).passed());
        assert!(e.evaluate_truthy(Value::Nil, false).passed());
        assert_eq!(
            e.evaluate_truthy(Value::Nil, false).kind,
            AssertionKind::AssertFalse
        );
    }

    #[test]
    fn custom_equality_is_used() {
        struct CaseInsensitive;
        impl Equality for CaseInsensitive {
            fn equals(&self, a: &Value, b: &Value) -> bool {
                a.to_string().eq_ignore_ascii_case(&b.to_string())
            }
        }
        let e = ResultEngine::new(CaseInsensitive);
        assert!(e.evaluate("ABC".into(), "abc".into(), false).passed());
    }

    #[test]
    fn output_comparison_ignores_surrounding_whitespace() {
        let e = engine();
        assert!(e.evaluate_output("\n.a {\n  color: red;  \n}\n\n", ".a {\n  color: red;\n}").passed());
        assert!(!e.evaluate_output(".a { color: red; }", ".a { color: blue; }").passed());
    }

    #[test]
    fn contains_requires_ordered_subsequence() {
        let e = engine();
        let actual = ".a {\n  color: red;\n  width: 1px;\n}";
        assert!(e.evaluate_contains(actual, "width: 1px;").passed());
        assert!(e.evaluate_contains(actual, ".a {\n  width: 1px;").passed());
        assert!(!e.evaluate_contains(actual, "width: 1px;\ncolor: red;").passed());
        assert!(!e.evaluate_contains(actual, "height: 2px;").passed());
    }

    #[test]
    fn empty_contains_block_fails() {
        let result = engine().evaluate_contains("anything", " \n\n");
        assert_eq!(result.status, Status::Fail);
        assert!(result.details.unwrap().contains("contains() block is empty"));
    }

    #[test]
    fn nan_is_never_equal() {
        let nan = || Value::Number(f64::NAN);
        assert_eq!(engine().evaluate(nan(), nan(), false).status, Status::Fail);
        assert!(engine().evaluate(nan(), nan(), true).passed());
    }

    #[test]
    fn verified_directives_are_not_deferred() {
        let verified = engine().structure_verified(3);
        assert_eq!(verified.kind, AssertionKind::AssertDirectives);
        assert_eq!(ResultEngine::classify(&verified, true), Outcome::Pass);
    }

    #[test]
    fn classification_respects_deferral() {
        let e = engine();
        let pass = e.evaluate_output("a", "a");
        let fail = e.evaluate_output("a", "b");
        let broken = e.structural_error("bad");
        assert_eq!(ResultEngine::classify(&pass, false), Outcome::Pass);
        assert_eq!(ResultEngine::classify(&fail, false), Outcome::Fail);
        assert_eq!(ResultEngine::classify(&pass, true), Outcome::OutputToCss);
        assert_eq!(ResultEngine::classify(&fail, true), Outcome::OutputToCss);
        assert_eq!(ResultEngine::classify(&broken, true), Outcome::Fail);

        let equal = e.evaluate(1i64.into(), 1i64.into(), false);
        assert_eq!(ResultEngine::classify(&equal, true), Outcome::Pass);
    }

    #[test]
    fn normalize_handles_blank_input() {
        assert_eq!(normalize_output("  \n\n"), "");
        assert_eq!(normalize_output("a  \n b"), "a\n b");
    }
}
