//! Run export and import using `MessagePack`.
//!
//! A [`RunRecord`] captures a finished (or paused) run in a form that does
//! not depend on the process that produced it: facts are stored by name and
//! rules by number.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use prodmodel_engine::{RuleId, Snapshot, Solver, Status};
use prodmodel_foundation::{Error, FactId, FactRegistry, Result, Vocabulary};

// =============================================================================
// Records
// =============================================================================

/// One history snapshot, with facts resolved to names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Step number the snapshot was taken after.
    pub step: u64,
    /// Completed passes at that point.
    pub iteration: u64,
    /// Rule examined by the step.
    pub examined: RuleId,
    /// Whether it fired.
    pub performing: bool,
    /// Status after the step.
    pub status: Status,
    /// Working memory, in assertion order.
    pub memory: Vec<String>,
    /// Pending rules, in queue order.
    pub pending: Vec<RuleId>,
    /// Fired rules, in firing order.
    pub fired: Vec<RuleId>,
}

impl SnapshotRecord {
    fn from_snapshot(snapshot: &Snapshot, registry: &FactRegistry) -> Self {
        Self {
            step: snapshot.step(),
            iteration: snapshot.iteration(),
            examined: snapshot.examined(),
            performing: snapshot.performing(),
            status: snapshot.status().clone(),
            memory: names(snapshot.memory().iter().copied(), registry),
            pending: snapshot.pending().iter().copied().collect(),
            fired: snapshot.fired().iter().copied().collect(),
        }
    }
}

/// A self-contained record of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Registered fact names.
    pub vocabulary: Vocabulary,
    /// Rules rendered as text, in declaration order.
    pub rules: Vec<String>,
    /// Status when the record was taken.
    pub status: Status,
    /// Rules examined.
    pub steps: u64,
    /// Completed passes.
    pub iteration: u64,
    /// Working memory, in assertion order.
    pub memory: Vec<String>,
    /// Fired rules, in firing order.
    pub fired: Vec<RuleId>,
    /// Retained history, oldest first.
    pub snapshots: Vec<SnapshotRecord>,
}

impl RunRecord {
    /// Captures the current state of `solver`.
    #[must_use]
    pub fn capture(solver: &Solver) -> Self {
        let registry = solver.registry();
        Self {
            vocabulary: registry.vocabulary().clone(),
            rules: solver
                .rules()
                .iter()
                .map(|rule| rule.display(registry).to_string())
                .collect(),
            status: solver.status().clone(),
            steps: solver.steps_taken(),
            iteration: solver.iteration(),
            memory: names(solver.memory().iter(), registry),
            fired: solver.fired().collect(),
            snapshots: solver
                .history()
                .iter()
                .map(|s| SnapshotRecord::from_snapshot(s, registry))
                .collect(),
        }
    }
}

fn names<I>(facts: I, registry: &FactRegistry) -> Vec<String>
where
    I: IntoIterator<Item = FactId>,
{
    facts
        .into_iter()
        .map(|f| registry.display_name(f).to_string())
        .collect()
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match &self.status {
            Status::Running => "running".to_string(),
            Status::Succeeded => "succeeded".to_string(),
            Status::Failed(deadlock) => format!("failed ({deadlock})"),
        };
        writeln!(
            f,
            "Run {status} after {} steps in {} passes",
            self.steps, self.iteration
        )?;

        writeln!(f, "Rules:")?;
        for (index, rule) in self.rules.iter().enumerate() {
            let id = RuleId::new(index);
            let mark = if self.fired.contains(&id) { '*' } else { ' ' };
            writeln!(f, " {mark} {id} {rule}")?;
        }

        writeln!(f, "Memory: {}", self.memory.join(", "))?;

        if !self.snapshots.is_empty() {
            writeln!(f, "History:")?;
            for snapshot in &self.snapshots {
                let verb = if snapshot.performing { "fired" } else { "skipped" };
                writeln!(
                    f,
                    "  step {:>3}  pass {:>2}  rule {} {verb}, memory [{}]",
                    snapshot.step,
                    snapshot.iteration,
                    snapshot.examined,
                    snapshot.memory.join(", ")
                )?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Serializes a run record to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(record: &RunRecord) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(record).map_err(|e| Error::serialization(e.to_string()))
}

/// Deserializes a run record from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_bytes(bytes: &[u8]) -> Result<RunRecord> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::serialization(e.to_string()))
}

/// Saves a run record to a file using `MessagePack` format.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to,
/// or if serialization fails.
pub fn save_to_file<P: AsRef<Path>>(record: &RunRecord, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| Error::io(format!("failed to create file '{}': {e}", path.display())))?;

    let mut writer = BufWriter::new(file);
    let bytes = to_bytes(record)?;

    writer
        .write_all(&bytes)
        .and_then(|()| writer.flush())
        .map_err(|e| Error::io(format!("failed to write to file '{}': {e}", path.display())))
}

/// Loads a run record from a `MessagePack` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<RunRecord> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::io(format!("failed to open file '{}': {e}", path.display())))?;

    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(format!("failed to read file '{}': {e}", path.display())))?;

    from_bytes(&bytes)
}

// =============================================================================
// Tests
// =============================================================================
