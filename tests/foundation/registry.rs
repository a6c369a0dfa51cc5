//! Integration tests for the fact registry
//!
//! Tests vocabulary registration, interning identity, and fact effects.

use std::cell::RefCell;
use std::rc::Rc;

use prodmodel_foundation::{ErrorKind, FactRegistry};
use proptest::prelude::*;

// =============================================================================
// Registration
// =============================================================================

#[test]
fn duplicate_registration_is_ignored() {
    let mut registry = FactRegistry::new();
    assert_eq!(registry.register(["A", "A"]).unwrap(), 1);

    let first = registry.get("A").unwrap();
    let second = registry.get("A").unwrap();
    assert_eq!(first, second);
    assert_eq!(registry.vocabulary().to_vec(), vec!["A"]);
}

#[test]
fn registration_is_all_or_nothing() {
    let mut registry = FactRegistry::with_names(["a"]).unwrap();
    let err = registry.register(["b", " ", "c"]).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::InvalidName(_)));
    assert_eq!(registry.vocabulary().len(), 1);
    assert!(!registry.contains_name("b"));
}

#[test]
fn names_are_trimmed() {
    let mut registry = FactRegistry::with_names(["  go to concert "]).unwrap();
    assert!(registry.contains_name("go to concert"));
    let a = registry.get("go to concert").unwrap();
    let b = registry.get(" go to concert").unwrap();
    assert_eq!(a, b);
}

#[test]
fn vocabulary_keeps_declaration_order() {
    let registry = FactRegistry::with_names(["c", "a", "b", "a"]).unwrap();
    let names: Vec<&str> = registry.vocabulary().iter().collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

// =============================================================================
// Lookup
// =============================================================================

#[test]
fn unknown_name_is_a_lookup_error() {
    let mut registry = FactRegistry::with_names(["a"]).unwrap();
    let err = registry.get("b").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownFact(ref n) if n == "b"));
    assert!(!err.is_validation());
}

#[test]
fn interning_is_lazy() {
    let mut registry = FactRegistry::with_names(["a", "b", "c"]).unwrap();
    assert_eq!(registry.interned_count(), 0);
    assert!(registry.lookup("b").is_none());

    let b = registry.get("b").unwrap();
    assert_eq!(registry.interned_count(), 1);
    assert_eq!(registry.lookup("b"), Some(b));
    assert_eq!(registry.name(b), Some("b"));
}

#[test]
fn handles_from_other_registries_are_foreign() {
    let mut first = FactRegistry::with_names(["a"]).unwrap();
    let mut second = FactRegistry::with_names(["a"]).unwrap();
    let a1 = first.get("a").unwrap();
    let a2 = second.get("a").unwrap();

    assert_ne!(a1, a2);
    assert!(first.check(a1).is_ok());
    assert!(first.check(a2).is_err());
    assert_eq!(first.display_name(a2), "?");
    assert_eq!(first.perform(a2), 0);
}

// =============================================================================
// Effects
// =============================================================================

#[test]
fn repeat_count_controls_invocations() {
    let mut registry = FactRegistry::with_names(["dance", "sing"]).unwrap();
    let calls = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&calls);
    registry
        .fact_mut("dance")
        .unwrap()
        .with_effect(move |name, vocabulary| {
            sink.borrow_mut().push((name.to_string(), vocabulary.len()));
        })
        .with_repeat(3)
        .unwrap();

    let dance = registry.get("dance").unwrap();
    assert_eq!(registry.perform(dance), 3);
    assert_eq!(
        *calls.borrow(),
        vec![("dance".to_string(), 2); 3]
    );
}

#[test]
fn fact_without_effect_performs_nothing() {
    let mut registry = FactRegistry::with_names(["quiet"]).unwrap();
    let quiet = registry.get("quiet").unwrap();
    assert!(!registry.fact(quiet).unwrap().has_effect());
    assert_eq!(registry.perform(quiet), 0);
}

#[test]
fn zero_repeat_is_rejected() {
    let mut registry = FactRegistry::with_names(["x"]).unwrap();
    let err = registry.fact_mut("x").unwrap().with_repeat(0).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(registry.fact_mut("x").unwrap().repeat(), 1);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn get_is_identity(names in prop::collection::vec("[a-z]{1,6}", 1..20), pick in any::<prop::sample::Index>()) {
        let mut registry = FactRegistry::with_names(&names).unwrap();
        let name = pick.get(&names);
        let first = registry.get(name).unwrap();
        let second = registry.get(name).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn vocabulary_has_no_duplicates(names in prop::collection::vec("[a-c]{1,2}", 0..30)) {
        let registry = FactRegistry::with_names(&names).unwrap();
        let mut seen: Vec<&str> = registry.vocabulary().iter().collect();
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), total);
    }
}
