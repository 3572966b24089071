use super::*;
use serde_json::json;

#[test]
fn placeholder_substitution_renders_field() {
    let evaluator = LuaEvaluator::new();
    let out = evaluator.evaluate("{E}.amount", &json!({"amount": 42})).expect("eval");
    assert_eq!(out.as_deref(), Some("42"));
}

#[test]
fn blank_expression_renders_empty() {
    let evaluator = LuaEvaluator::new();
    assert_eq!(evaluator.evaluate("", &json!({})).expect("eval"), None);
    assert_eq!(evaluator.evaluate("   ", &json!({})).expect("eval"), None);
}

#[test]
fn nil_result_renders_empty() {
    let evaluator = LuaEvaluator::new();
    let out = evaluator.evaluate("{E}.missing", &json!({"amount": 1})).expect("eval");
    assert_eq!(out, None);
}

#[test]
fn string_result_renders_verbatim() {
    let evaluator = LuaEvaluator::new();
    let out = evaluator.evaluate("{E}.name", &json!({"name": "Acme"})).expect("eval");
    assert_eq!(out.as_deref(), Some("Acme"));
}

#[test]
fn arithmetic_over_fields() {
    let evaluator = LuaEvaluator::new();
    let out = evaluator
        .evaluate("{E}.a + {E}.b", &json!({"a": 2, "b": 3}))
        .expect("eval");
    assert_eq!(out.as_deref(), Some("5"));
}

#[test]
fn boolean_result() {
    let evaluator = LuaEvaluator::new();
    let out = evaluator.evaluate("{E}.amount > 10", &json!({"amount": 42})).expect("eval");
    assert_eq!(out.as_deref(), Some("true"));
}

#[test]
fn array_field_renders_as_json() {
    let evaluator = LuaEvaluator::new();
    let out = evaluator.evaluate("{E}.tags", &json!({"tags": [1, 2, 3]})).expect("eval");
    assert_eq!(out.as_deref(), Some("[1,2,3]"));
}

#[test]
fn statement_form_with_explicit_return() {
    let evaluator = LuaEvaluator::new();
    let out = evaluator
        .evaluate("local v = {E}.amount * 2 return v", &json!({"amount": 21}))
        .expect("eval");
    assert_eq!(out.as_deref(), Some("42"));
}

#[test]
fn runtime_failure_is_classified_runtime() {
    let evaluator = LuaEvaluator::new();
    let err = evaluator
        .evaluate("{E}.customer.name", &json!({"amount": 1}))
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Runtime);
    assert!(!err.message.is_empty());
}

#[test]
fn syntax_failure_is_classified_compile() {
    let evaluator = LuaEvaluator::new();
    let err = evaluator.evaluate("1 +", &json!({})).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Compile);
}

#[test]
fn invocations_are_isolated() {
    let evaluator = LuaEvaluator::new();
    // A global assigned in one invocation must not be visible in the next.
    let script = "counter = (counter or 0) + 1 return counter";
    let first = evaluator.evaluate(script, &json!({})).expect("eval");
    let second = evaluator.evaluate(script, &json!({})).expect("eval");
    assert_eq!(first.as_deref(), Some("1"));
    assert_eq!(second.as_deref(), Some("1"));
}

#[test]
fn record_is_rebound_per_invocation() {
    let evaluator = LuaEvaluator::new();
    let a = evaluator.evaluate("{E}.v", &json!({"v": 1})).expect("eval");
    let b = evaluator.evaluate("{E}.v", &json!({"v": 2})).expect("eval");
    assert_eq!(a.as_deref(), Some("1"));
    assert_eq!(b.as_deref(), Some("2"));
}

#[test]
fn verify_syntax_failure_blocks() {
    let evaluator = LuaEvaluator::new();
    match verify_expression(&evaluator, "1 +", &json!({})) {
        VerifyOutcome::CompilationFailed(detail) => assert!(!detail.is_empty()),
        other => panic!("expected compilation failure, got {:?}", other),
    }
}

#[test]
fn verify_runtime_failure_still_valid() {
    let evaluator = LuaEvaluator::new();
    // placeholder records carry no nested values; a runtime failure here must
    // not block the user from saving the column
    let outcome = verify_expression(&evaluator, "{E}.customer.name", &json!({}));
    assert_eq!(outcome, VerifyOutcome::Valid);
}

#[test]
fn verify_blank_expression_is_valid() {
    let evaluator = LuaEvaluator::new();
    assert_eq!(verify_expression(&evaluator, "", &json!({})), VerifyOutcome::Valid);
}

#[test]
fn verify_good_expression_is_valid() {
    let evaluator = LuaEvaluator::new();
    assert_eq!(
        verify_expression(&evaluator, "{E}.amount", &json!({"amount": 0})),
        VerifyOutcome::Valid
    );
}
