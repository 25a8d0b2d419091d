//! Scope stack: tracks module, test and assertion nesting.
//!
//! Entries are pushed and popped in call-tree order. Lookups by kind return
//! the most recently pushed label of that kind, which is how an assertion
//! without a description borrows the name of its enclosing test.

use std::fmt;

use serde::Serialize;

use crate::diagnostics::{Result, VerityError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Module,
    Test,
    Assert,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Module => "module",
            ScopeKind::Test => "test",
            ScopeKind::Assert => "assert",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeEntry {
    pub kind: ScopeKind,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    entries: Vec<ScopeEntry>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scope. Any kind may nest under any other.
    pub fn push(&mut self, kind: ScopeKind, label: impl Into<String>) {
        self.entries.push(ScopeEntry {
            kind,
            label: label.into(),
        });
    }

    /// Removes and returns the innermost scope.
    pub fn pop(&mut self) -> Result<ScopeEntry> {
        self.entries
            .pop()
            .ok_or(VerityError::Underflow { expected: None })
    }

    /// Pops the innermost scope only if it has the given kind. The stack is
    /// left untouched on mismatch.
    pub fn pop_expecting(&mut self, kind: ScopeKind) -> Result<ScopeEntry> {
        match self.entries.last() {
            None => Err(VerityError::Underflow {
                expected: Some(kind),
            }),
            Some(entry) if entry.kind != kind => Err(VerityError::ScopeMismatch {
                expected: kind,
                found: entry.kind,
            }),
            Some(_) => self.pop(),
        }
    }

    /// Label of the most recently pushed scope of `kind`.
    pub fn current(&self, kind: ScopeKind) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.label.as_str())
    }

    /// Every label of `kind`, outermost first.
    pub fn all_of_kind(&self, kind: ScopeKind) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.label.as_str())
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    /// Labels joined outermost to innermost, e.g. `math :: adds :: 1 + 1`.
    pub fn path(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.label.as_str())
            .collect::<Vec<_>>()
            .join(" :: ")
    }
}

/// Description for an assertion: the explicit one when given and non-empty,
/// otherwise the label of the enclosing test, otherwise empty.
pub fn resolve_description(stack: &ScopeStack, explicit: Option<&str>) -> String {
    match explicit {
        Some(description) if !description.trim().is_empty() => description.to_string(),
        _ => stack
            .current(ScopeKind::Test)
            .map(str::to_string)
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_returns_latest_label_of_kind() {
        let mut stack = ScopeStack::new();
        assert_eq!(stack.current(ScopeKind::Test), None);

        stack.push(ScopeKind::Module, "outer");
        stack.push(ScopeKind::Test, "first");
        stack.push(ScopeKind::Module, "inner");
        assert_eq!(stack.current(ScopeKind::Module), Some("inner"));
        assert_eq!(stack.current(ScopeKind::Test), Some("first"));

        stack.pop().unwrap();
        assert_eq!(stack.current(ScopeKind::Module), Some("outer"));
    }

    #[test]
    fn pop_on_empty_stack_underflows() {
        let mut stack = ScopeStack::new();
        let err = stack.pop().unwrap_err();
        assert!(matches!(err, VerityError::Underflow { expected: None }));
    }

    #[test]
    fn pop_then_repush_replaces_label() {
        let mut stack = ScopeStack::new();
        stack.push(ScopeKind::Test, "before");
        let popped = stack.pop().unwrap();
        assert_eq!(popped.label, "before");
        stack.push(ScopeKind::Test, "after");
        assert_eq!(stack.current(ScopeKind::Test), Some("after"));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn all_of_kind_keeps_insertion_order() {
        let mut stack = ScopeStack::new();
        stack.push(ScopeKind::Module, "a");
        stack.push(ScopeKind::Test, "t");
        stack.push(ScopeKind::Module, "b");
        assert_eq!(stack.all_of_kind(ScopeKind::Module), vec!["a", "b"]);
        assert!(stack.all_of_kind(ScopeKind::Assert).is_empty());
        assert_eq!(stack.path(), "a :: t :: b");
    }

    #[test]
    fn checked_pop_rejects_wrong_kind() {
        let mut stack = ScopeStack::new();
        stack.push(ScopeKind::Module, "m");
        stack.push(ScopeKind::Test, "t");

        let err = stack.pop_expecting(ScopeKind::Module).unwrap_err();
        assert!(matches!(
            err,
            VerityError::ScopeMismatch {
                expected: ScopeKind::Module,
                found: ScopeKind::Test
            }
        ));
        assert_eq!(stack.depth(), 2);

        assert_eq!(stack.pop_expecting(ScopeKind::Test).unwrap().label, "t");
        assert_eq!(stack.pop_expecting(ScopeKind::Module).unwrap().label, "m");
        assert!(matches!(
            stack.pop_expecting(ScopeKind::Module),
            Err(VerityError::Underflow {
                expected: Some(ScopeKind::Module)
            })
        ));
    }

    #[test]
    fn description_falls_back_to_enclosing_test() {
        let mut stack = ScopeStack::new();
        assert_eq!(resolve_description(&stack, None), "");

        stack.push(ScopeKind::Module, "strings");
        stack.push(ScopeKind::Test, "joins words");
        assert_eq!(resolve_description(&stack, None), "joins words");
        assert_eq!(resolve_description(&stack, Some("  ")), "joins words");
        assert_eq!(resolve_description(&stack, Some("custom")), "custom");
    }
}
