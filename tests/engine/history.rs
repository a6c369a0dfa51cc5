//! Run history integration tests
//!
//! Tests snapshot policies, eviction, and rewinding.

use prodmodel_engine::{Rule, SnapshotPolicy, Solver, SolverConfig, Status};
use prodmodel_foundation::{ErrorKind, FactRegistry};

fn chain(config: SolverConfig) -> Solver {
    let mut registry = FactRegistry::with_names(["A", "B", "C", "X"]).unwrap();
    let f = registry.get_all(["A", "B", "C", "X"]).unwrap();
    Solver::with_config(
        registry,
        [f[0]],
        [
            Rule::implies([f[3]], [f[0]]),
            Rule::implies([f[1]], [f[2]]),
            Rule::implies([f[0]], [f[1]]),
        ],
        config,
    )
    .unwrap()
}

#[test]
fn fire_policy_records_firings_only() {
    let mut solver = chain(SolverConfig::default());
    solver.run_to_completion();

    let steps: Vec<u64> = solver.history().iter().map(|s| s.step()).collect();
    assert_eq!(steps, vec![3, 5]);
    assert!(solver.history().iter().all(|s| s.performing()));
}

#[test]
fn every_step_policy_records_all() {
    let mut solver = chain(SolverConfig::new().with_snapshots(SnapshotPolicy::EveryStep));
    solver.run_to_completion();
    assert_eq!(solver.history().len() as u64, solver.steps_taken());
}

#[test]
fn never_policy_keeps_history_empty() {
    let mut solver = chain(SolverConfig::new().with_snapshots(SnapshotPolicy::Never));
    solver.run_to_completion();
    assert!(solver.history().is_empty());
    assert!(matches!(
        solver.rewind(1).unwrap_err().kind,
        ErrorKind::SnapshotNotFound(1)
    ));
}

#[test]
fn capacity_evicts_oldest() {
    let mut solver = chain(
        SolverConfig::new()
            .with_snapshots(SnapshotPolicy::EveryStep)
            .with_history_capacity(2),
    );
    solver.run_to_completion();
    assert_eq!(solver.history().len(), 2);
    assert_eq!(
        solver.history().step_range(),
        Some((solver.steps_taken() - 1, solver.steps_taken()))
    );
}

#[test]
fn rewind_then_replay_is_deterministic() {
    let mut solver = chain(SolverConfig::new().with_snapshots(SnapshotPolicy::EveryStep));
    let first = solver.run_to_completion();
    let memory: Vec<_> = solver.memory().iter().collect();

    solver.rewind(2).unwrap();
    assert_eq!(solver.steps_taken(), 2);
    assert_eq!(solver.status(), &Status::Running);
    assert_eq!(solver.history().latest().map(|s| s.step()), Some(2));

    let second = solver.run_to_completion();
    assert_eq!(first, second);
    assert_eq!(solver.memory().iter().collect::<Vec<_>>(), memory);
}
