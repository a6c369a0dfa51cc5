//! Run export through the rulebase, solver, and serializer

use prodmodel_engine::{SnapshotPolicy, SolverConfig, Status};
use prodmodel_runtime::{RunRecord, Rulebase, from_bytes, load_from_file, save_to_file, to_bytes};

const TEXT: &str = "\
facts: seed, sprout, flower
input: seed
rule grow: seed -> sprout
rule bloom: sprout -> flower
";

fn finished(config: SolverConfig) -> RunRecord {
    let mut solver = Rulebase::parse(TEXT).unwrap().build(config).unwrap();
    solver.run_to_completion();
    RunRecord::capture(&solver)
}

#[test]
fn record_reflects_the_run() {
    let record = finished(SolverConfig::default());
    assert_eq!(record.status, Status::Succeeded);
    assert_eq!(record.rules, vec!["If seed, then sprout.", "If sprout, then flower."]);
    assert_eq!(record.memory, vec!["seed", "sprout", "flower"]);
    assert_eq!(record.snapshots.len(), 2);
}

#[test]
fn record_survives_a_file() {
    let record = finished(SolverConfig::new().with_snapshots(SnapshotPolicy::EveryStep));
    let path = std::env::temp_dir().join(format!(
        "prodmodel-export-{}.msgpack",
        std::process::id()
    ));

    save_to_file(&record, &path).unwrap();
    let loaded = load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded, record);
    assert!(loaded.to_string().starts_with("Run succeeded after 2 steps in 1 passes"));
}

#[test]
fn truncated_bytes_fail_to_decode() {
    let bytes = to_bytes(&finished(SolverConfig::default())).unwrap();
    assert!(from_bytes(&bytes[..bytes.len() / 2]).is_err());
}
