// End-to-end behavior of the scope stack, the output-context validator and
// the result engine, driven through a Session.

mod common;

use verity::config::{OutputMode, RunConfig};
use verity::context::{self, Directive, OutputContext};
use verity::results::{ResultEngine, Status};
use verity::scope::{ScopeKind, ScopeStack};
use verity::value::Value;
use verity::VerityError;

use common::{assert_rendered, buffered_session};

fn feed(directives: &[Option<Directive>]) -> verity::Result<OutputContext> {
    directives
        .iter()
        .try_fold(OutputContext::new(), |state, d| context::validate(state, *d))
}

// ============================================================================
// SCOPE STACK
// ============================================================================

#[test]
fn current_tracks_the_latest_label_of_each_kind() {
    let mut stack = ScopeStack::new();
    assert_eq!(stack.current(ScopeKind::Test), None);
    stack.push(ScopeKind::Module, "outer");
    stack.push(ScopeKind::Test, "first");
    stack.pop().unwrap();
    stack.push(ScopeKind::Module, "inner");
    stack.push(ScopeKind::Test, "second");
    assert_eq!(stack.current(ScopeKind::Module), Some("inner"));
    assert_eq!(stack.current(ScopeKind::Test), Some("second"));
    assert_eq!(stack.all_of_kind(ScopeKind::Module), vec!["outer", "inner"]);

    for _ in 0..3 {
        stack.pop().unwrap();
    }
    assert!(stack.is_empty());
    assert!(matches!(stack.pop(), Err(VerityError::Underflow { .. })));
}

#[test]
fn out_of_order_pop_is_a_checked_error() {
    let mut stack = ScopeStack::new();
    stack.push(ScopeKind::Test, "t");
    stack.push(ScopeKind::Assert, "a");
    let err = stack.pop_expecting(ScopeKind::Test).unwrap_err();
    assert!(matches!(
        err,
        VerityError::ScopeMismatch {
            expected: ScopeKind::Test,
            found: ScopeKind::Assert
        }
    ));
    assert_eq!(stack.depth(), 2);
}

// ============================================================================
// OUTPUT CONTEXT VALIDATOR
// ============================================================================

#[test]
fn well_formed_triples_finalize_in_any_wrapper_first_order() {
    use Directive::*;
    for order in [
        [Assert, Output, Expect],
        [Assert, Expect, Output],
        [Assert, Output, Contains],
        [Assert, Contains, Output],
    ] {
        let mut sequence: Vec<Option<Directive>> = order.iter().copied().map(Some).collect();
        sequence.push(None);
        let state = feed(&sequence).unwrap();
        assert!(state.is_empty(), "{order:?} left state behind");
    }
}

#[test]
fn missing_wrapper_is_rejected() {
    let err = feed(&[Some(Directive::Output), Some(Directive::Expect), None]).unwrap_err();
    assert!(err.to_string().contains("assert() wrapper is required"));
}

#[test]
fn second_output_is_rejected_with_once_per_assert() {
    use Directive::*;
    let err = feed(&[Some(Assert), Some(Output), Some(Output), Some(Expect), None]).unwrap_err();
    assert_eq!(err.to_string(), "output() must only be used once per assert()");
}

#[test]
fn expect_and_contains_together_fail_at_finalization() {
    use Directive::*;
    let state = feed(&[Some(Assert), Some(Output), Some(Expect), Some(Contains)]).unwrap();
    assert_eq!(state.declared().len(), 4);
    let err = context::validate(state, None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "each assert() must contain one output(), and one expect() or contains()"
    );
}

// ============================================================================
// RESULT ENGINE
// ============================================================================

#[test]
fn equality_and_inverted_equality() {
    let engine = ResultEngine::default();
    let five = || Value::from(5i64);
    assert_eq!(engine.evaluate(five(), five(), false).status, Status::Pass);
    assert_eq!(engine.evaluate(five(), 6i64.into(), false).status, Status::Fail);
    assert_eq!(engine.evaluate(five(), 6i64.into(), true).status, Status::Pass);
    assert_eq!(engine.evaluate(five(), five(), true).status, Status::Fail);
}

#[test]
fn truthiness_overrides_only_empty_text_and_lists() {
    assert!(!ResultEngine::is_truthy(&Value::from("")));
    assert!(!ResultEngine::is_truthy(&Value::List(vec![])));
    assert!(ResultEngine::is_truthy(&Value::from(0i64)));
    assert!(ResultEngine::is_truthy(&Value::from("non-empty")));
    assert!(!ResultEngine::is_truthy(&Value::Nil));
    assert!(!ResultEngine::is_truthy(&Value::Bool(false)));
}

// ============================================================================
// SESSION
// ============================================================================

#[test]
fn one_module_one_test_one_matching_triple() {
    let (mut session, _) = buffered_session(RunConfig::default());
    session
        .module("Rendering", |s| {
            s.test("renders a rule", |s| {
                assert_rendered(s, "matches", ".a { color: red; }", ".a { color: red; }")
            })
        })
        .unwrap();

    let counters = *session.counters();
    assert_eq!(counters.run, 1);
    assert_eq!(counters.pass, 1);
    assert_eq!(counters.assertions, 1);
    assert_eq!(counters.tests, 1);
    assert_eq!(counters.modules, 1);
    assert!(session.output_context().is_empty());
    assert!(session.stack().is_empty());
}

#[test]
fn emit_mode_buckets_the_triple_as_output_to_css() {
    let config = RunConfig {
        output_mode: OutputMode::Emit,
        ..RunConfig::default()
    };
    let (mut session, _) = buffered_session(config);
    session
        .module("Rendering", |s| {
            s.test("renders a rule", |s| assert_rendered(s, "deferred", "a", "b"))
        })
        .unwrap();
    let counters = *session.counters();
    assert_eq!(counters.output_to_css, 1);
    assert_eq!(counters.pass + counters.fail, 0);
    assert!(session.finish().warnings.is_empty());
}

#[test]
fn structural_errors_fail_the_test_and_later_tests_still_run() {
    let (mut session, _) = buffered_session(RunConfig::default());
    session
        .module("m", |s| {
            s.test("broken", |s| {
                s.assert_output(None, |s| s.output(|_| Ok(())))?;
                Ok(())
            })?;
            s.test("fine", |s| {
                s.assert_true("yes", None)?;
                Ok(())
            })
        })
        .unwrap();
    let report = session.finish();
    assert_eq!(report.counters.run, 2);
    assert_eq!(report.counters.fail, 1);
    assert_eq!(report.counters.pass, 1);
    assert!(report.warnings.is_empty());
}

#[test]
fn contains_matches_an_ordered_subset_of_lines() {
    let (mut session, _) = buffered_session(RunConfig::default());
    let result = session
        .test("subset", |s| {
            s.assert_output(None, |s| {
                s.output(|s| {
                    s.emit(".a { color: red; }\n.b { color: blue; }\n.c { color: green; }");
                    Ok(())
                })?;
                s.contains(|s| {
                    s.emit(".a { color: red; }\n.c { color: green; }");
                    Ok(())
                })
            })
        })
        .unwrap();
    assert!(result.passed());
}
