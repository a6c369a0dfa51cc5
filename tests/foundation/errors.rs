//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use prodmodel_foundation::{Error, ErrorContext, ErrorKind, FactRegistry};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_unknown_fact() {
    let err = Error::unknown_fact("buy tickets");
    assert!(matches!(err.kind, ErrorKind::UnknownFact(_)));
    let msg = format!("{err}");
    assert!(msg.contains("buy tickets"));
}

#[test]
fn error_invalid_name() {
    let err = Error::invalid_name("   ");
    assert!(matches!(err.kind, ErrorKind::InvalidName(_)));
    assert!(err.is_validation());
}

#[test]
fn error_invalid_repeat() {
    let err = Error::invalid_repeat("dance");
    let msg = format!("{err}");
    assert!(msg.contains("dance"));
    assert!(msg.contains("at least 1"));
}

#[test]
fn error_foreign_fact_names_both_registries() {
    let mut theirs = FactRegistry::with_names(["a"]).unwrap();
    let ours = FactRegistry::with_names(["a"]).unwrap();
    let fact = theirs.get("a").unwrap();

    let err = ours.check(fact).unwrap_err();
    assert!(err.is_validation());
    let msg = format!("{err}");
    assert!(msg.contains(&ours.id().to_string()));
    assert!(msg.contains(&theirs.id().to_string()));
}

#[test]
fn error_unknown_rule_and_snapshot() {
    assert_eq!(Error::unknown_rule(7).to_string(), "unknown rule: #7");
    assert_eq!(
        Error::snapshot_not_found(3).to_string(),
        "no snapshot recorded for step 3"
    );
}

#[test]
fn error_parse_carries_line() {
    let err = Error::parse("expected '->'", 12, "rule: a b");
    match &err.kind {
        ErrorKind::ParseError {
            line,
            context,
            message,
        } => {
            assert_eq!(*line, 12);
            assert_eq!(context, "rule: a b");
            assert_eq!(message, "expected '->'");
        }
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[test]
fn runtime_kinds_are_not_validation() {
    assert!(!Error::io("disk full").is_validation());
    assert!(!Error::serialization("truncated").is_validation());
    assert!(!Error::invalid_command("fly").is_validation());
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_location() {
    let ctx = ErrorContext::new().with_source("plan.rules").with_line(9);
    assert_eq!(ctx.to_string(), "at plan.rules:9");
}

#[test]
fn context_attached_to_error() {
    let err = Error::unknown_fact("x").with_context(ErrorContext::new().with_frame("build"));
    let ctx = err.context.unwrap();
    assert_eq!(ctx.stack, vec!["build".to_string()]);
}
