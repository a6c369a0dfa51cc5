//! Solver integration tests
//!
//! Tests the documented scenarios, pass structure, and effect ordering.

use std::cell::RefCell;
use std::rc::Rc;

use prodmodel_engine::{Rule, RuleId, Solver, Status, StepOutcome, Termination};
use prodmodel_foundation::{FactId, FactRegistry};

fn registry(names: &[&str]) -> (FactRegistry, Vec<FactId>) {
    let mut registry = FactRegistry::with_names(names).unwrap();
    let ids = registry.get_all(names).unwrap();
    (registry, ids)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn chain_succeeds_with_each_rule_firing_once() {
    let (registry, f) = registry(&["A", "B", "C"]);
    let mut solver = Solver::new(
        registry,
        [f[0]],
        [Rule::implies([f[0]], [f[1]]), Rule::implies([f[1]], [f[2]])],
    )
    .unwrap();

    let mut fired = Vec::new();
    let termination = solver.run_observed(|_, outcome| {
        if let StepOutcome::Examined(step) = outcome {
            if step.performing {
                fired.push(step.rule);
            }
        }
    });

    assert_eq!(termination, Termination::Succeeded);
    assert_eq!(fired, vec![RuleId::new(0), RuleId::new(1)]);
    assert_eq!(solver.memory().names(solver.registry()), vec!["A", "B", "C"]);
}

#[test]
fn unreachable_rule_fails_naming_it() {
    let (registry, f) = registry(&["A", "X", "Y"]);
    let mut solver = Solver::new(registry, [f[0]], [Rule::implies([f[1]], [f[2]])]).unwrap();

    let termination = solver.run_to_completion();
    let deadlock = termination.deadlock().unwrap();
    assert_eq!(deadlock.unsatisfied, vec![RuleId::new(0)]);
    assert_eq!(deadlock.to_string(), "no progress possible; rules #1 can never be satisfied");
    assert_eq!(solver.memory().names(solver.registry()), vec!["A"]);
}

#[test]
fn reversed_chain_needs_one_pass_per_link() {
    let names: Vec<String> = (0..5).map(|i| format!("s{i}")).collect();
    let mut registry = FactRegistry::with_names(&names).unwrap();
    let f = registry.get_all(&names).unwrap();
    let rules: Vec<Rule> = (0..4).rev().map(|i| Rule::implies([f[i]], [f[i + 1]])).collect();

    let mut solver = Solver::new(registry, [f[0]], rules).unwrap();
    assert!(solver.run_to_completion().is_success());
    assert_eq!(solver.iteration(), 4);
    assert_eq!(solver.memory().len(), 5);
}

#[test]
fn facts_land_in_conclusion_order() {
    let (registry, f) = registry(&["start", "x", "y", "z"]);
    let mut solver =
        Solver::new(registry, [f[0]], [Rule::implies([f[0]], [f[3], f[1], f[2]])]).unwrap();

    let StepOutcome::Examined(step) = solver.step() else {
        panic!("expected an examined rule");
    };
    assert_eq!(step.asserted, vec![f[3], f[1], f[2]]);
    assert_eq!(
        solver.memory().names(solver.registry()),
        vec!["start", "z", "x", "y"]
    );
}

#[test]
fn effects_run_in_firing_order() {
    let (mut registry, f) = registry(&["A", "B", "C"]);
    let log = Rc::new(RefCell::new(Vec::new()));
    for name in ["B", "C"] {
        let sink = Rc::clone(&log);
        registry
            .fact_mut(name)
            .unwrap()
            .with_effect(move |fact, _| sink.borrow_mut().push(fact.to_string()));
    }
    registry.fact_mut("C").unwrap().with_repeat(2).unwrap();

    let mut solver = Solver::new(
        registry,
        [f[0]],
        [Rule::implies([f[1]], [f[2]]), Rule::implies([f[0]], [f[1]])],
    )
    .unwrap();
    solver.run_to_completion();

    assert_eq!(*log.borrow(), vec!["B", "C", "C"]);
}

#[test]
fn rule_without_conditions_fires_immediately() {
    let (registry, f) = registry(&["given"]);
    let mut solver = Solver::new(registry, Vec::new(), [Rule::new().then([f[0]])]).unwrap();

    assert_eq!(solver.step().verdict(), None);
    assert!(solver.memory().contains(f[0]));
    assert_eq!(solver.step(), StepOutcome::Succeeded);
}

#[test]
fn terminal_status_is_sticky() {
    let (registry, f) = registry(&["A", "B"]);
    let mut solver = Solver::new(registry, [f[0]], [Rule::implies([f[1]], [f[0]])]).unwrap();
    solver.run_to_completion();

    let steps = solver.steps_taken();
    for _ in 0..3 {
        assert_eq!(solver.step().verdict(), Some(false));
    }
    assert_eq!(solver.steps_taken(), steps);
    assert!(matches!(solver.status(), Status::Failed(_)));
}

#[test]
fn current_follows_the_cursor() {
    let (registry, f) = registry(&["A", "B", "X"]);
    let mut solver = Solver::new(
        registry,
        [f[0]],
        [Rule::implies([f[2]], [f[1]]), Rule::implies([f[0]], [f[1]])],
    )
    .unwrap();

    assert_eq!(solver.current(), Some(RuleId::new(0)));
    solver.step();
    assert_eq!(solver.current(), Some(RuleId::new(1)));
    solver.step();
    assert_eq!(solver.current(), Some(RuleId::new(0)));
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn foreign_rule_facts_are_rejected() {
    let (registry, _) = registry(&["A"]);
    let (_, other) = self::registry(&["A"]);
    let err = Solver::new(registry, Vec::new(), [Rule::implies([other[0]], [other[0]])])
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn unknown_rule_accessor_errors() {
    let (registry, f) = registry(&["A"]);
    let solver = Solver::new(registry, [f[0]], Vec::new()).unwrap();
    assert!(solver.rule(RuleId::new(3)).is_err());
}
