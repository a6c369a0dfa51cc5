//! Property tests for the solver
//!
//! Checks interning identity, satisfiability monotonicity, at-most-once
//! firing, and that a finished run reaches the naive fixpoint.

use std::collections::BTreeSet;

use prodmodel_engine::{Rule, Solver, StepOutcome, Termination};
use prodmodel_foundation::{FactId, FactRegistry};
use proptest::prelude::*;

const FACTS: usize = 8;

type RuleSpec = (Vec<usize>, Vec<usize>);

fn rule_specs() -> impl Strategy<Value = Vec<RuleSpec>> {
    prop::collection::vec(
        (
            prop::collection::vec(0..FACTS, 0..3),
            prop::collection::vec(0..FACTS, 1..3),
        ),
        0..10,
    )
}

fn inputs() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..FACTS, 0..3)
}

fn build(specs: &[RuleSpec], inputs: &[usize]) -> (Solver, Vec<FactId>) {
    let names: Vec<String> = (0..FACTS).map(|i| format!("f{i}")).collect();
    let mut registry = FactRegistry::with_names(&names).unwrap();
    let ids = registry.get_all(&names).unwrap();
    let rules: Vec<Rule> = specs
        .iter()
        .map(|(conditions, conclusions)| {
            Rule::implies(
                conditions.iter().map(|&i| ids[i]),
                conclusions.iter().map(|&i| ids[i]),
            )
        })
        .collect();
    let solver = Solver::new(registry, inputs.iter().map(|&i| ids[i]), rules).unwrap();
    (solver, ids)
}

/// Forward closure computed by repeated sweeps, ignoring rule order.
fn closure(specs: &[RuleSpec], inputs: &[usize]) -> BTreeSet<usize> {
    let mut known: BTreeSet<usize> = inputs.iter().copied().collect();
    loop {
        let before = known.len();
        for (conditions, conclusions) in specs {
            if conditions.iter().all(|c| known.contains(c)) {
                known.extend(conclusions.iter().copied());
            }
        }
        if known.len() == before {
            return known;
        }
    }
}

proptest! {
    #[test]
    fn memory_only_grows(specs in rule_specs(), inputs in inputs()) {
        let (mut solver, _) = build(&specs, &inputs);
        let mut previous: Vec<FactId> = solver.memory().iter().collect();
        loop {
            let outcome = solver.step();
            let current: Vec<FactId> = solver.memory().iter().collect();
            prop_assert!(current.starts_with(&previous));
            previous = current;
            if outcome.is_terminal() {
                break;
            }
        }
    }

    #[test]
    fn satisfied_rules_stay_satisfied(specs in rule_specs(), inputs in inputs()) {
        let (mut solver, _) = build(&specs, &inputs);
        let mut satisfied = vec![false; specs.len()];
        loop {
            let outcome = solver.step();
            for (i, rule) in solver.rules().iter().enumerate() {
                let now = rule.is_satisfied(solver.memory());
                prop_assert!(now || !satisfied[i]);
                satisfied[i] = now;
            }
            if outcome.is_terminal() {
                break;
            }
        }
    }

    #[test]
    fn rules_fire_at_most_once(specs in rule_specs(), inputs in inputs()) {
        let (mut solver, _) = build(&specs, &inputs);
        let mut fired = Vec::new();
        solver.run_observed(|_, outcome| {
            if let StepOutcome::Examined(step) = outcome {
                if step.performing {
                    fired.push(step.rule);
                }
            }
        });
        let unique: BTreeSet<_> = fired.iter().copied().collect();
        prop_assert_eq!(unique.len(), fired.len());
        prop_assert_eq!(solver.fired().collect::<Vec<_>>(), fired);
    }

    #[test]
    fn run_reaches_fixpoint(specs in rule_specs(), inputs in inputs()) {
        let (mut solver, ids) = build(&specs, &inputs);
        let termination = solver.run_to_completion();

        let expected = closure(&specs, &inputs);
        let reached: BTreeSet<usize> = solver
            .memory()
            .iter()
            .map(|f| ids.iter().position(|&id| id == f).unwrap())
            .collect();
        prop_assert_eq!(&reached, &expected);

        let all_fire = specs
            .iter()
            .all(|(conditions, _)| conditions.iter().all(|c| expected.contains(c)));
        prop_assert_eq!(termination == Termination::Succeeded, all_fire);
    }

    #[test]
    fn deadlock_names_exactly_the_unfired(specs in rule_specs(), inputs in inputs()) {
        let (mut solver, _) = build(&specs, &inputs);
        if let Termination::Failed(deadlock) = solver.run_to_completion() {
            let pending: Vec<_> = solver.pending().collect();
            prop_assert_eq!(&deadlock.unsatisfied, &pending);
            for id in &deadlock.unsatisfied {
                prop_assert!(!solver.rule(*id).unwrap().is_satisfied(solver.memory()));
            }
        }
    }

    #[test]
    fn reinterning_is_identity(pick in 0..FACTS) {
        let names: Vec<String> = (0..FACTS).map(|i| format!("f{i}")).collect();
        let mut registry = FactRegistry::with_names(&names).unwrap();
        let first = registry.get(&names[pick]).unwrap();
        registry.register(&names).unwrap();
        prop_assert_eq!(registry.get(&names[pick]).unwrap(), first);
    }
}
