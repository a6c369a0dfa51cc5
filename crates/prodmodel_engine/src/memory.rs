//! Working memory: the ordered record of asserted facts.
//!
//! Backed by persistent collections, so taking a snapshot is a constant-time
//! clone that shares structure with the live memory.

use prodmodel_foundation::{FactId, FactRegistry};

/// Append-only, ordered collection of asserted facts.
///
/// Order reflects assertion order. A fact asserted twice appears twice; the
/// membership test ignores multiplicity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkingMemory {
    sequence: im::Vector<FactId>,
    present: im::HashSet<FactId>,
}

impl WorkingMemory {
    /// Creates an empty working memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a working memory seeded with `facts`, in order.
    pub fn with_facts<I>(facts: I) -> Self
    where
        I: IntoIterator<Item = FactId>,
    {
        let mut memory = Self::new();
        memory.assert_all(facts);
        memory
    }

    /// Appends a fact.
    pub fn assert(&mut self, fact: FactId) {
        self.sequence.push_back(fact);
        self.present.insert(fact);
    }

    /// Appends several facts, in order.
    pub fn assert_all<I>(&mut self, facts: I)
    where
        I: IntoIterator<Item = FactId>,
    {
        for fact in facts {
            self.assert(fact);
        }
    }

    /// Returns true if `fact` has been asserted.
    #[must_use]
    pub fn contains(&self, fact: FactId) -> bool {
        self.present.contains(&fact)
    }

    /// Returns an immutable, ordered copy of the current contents.
    #[must_use]
    pub fn snapshot_view(&self) -> im::Vector<FactId> {
        self.sequence.clone()
    }

    /// Returns the number of assertions (duplicates included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns true if nothing has been asserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Returns the fact asserted at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<FactId> {
        self.sequence.get(position).copied()
    }

    /// Iterates over facts in assertion order.
    pub fn iter(&self) -> impl Iterator<Item = FactId> + '_ {
        self.sequence.iter().copied()
    }

    /// Resolves the facts to their names, in assertion order.
    #[must_use]
    pub fn names<'r>(&self, registry: &'r FactRegistry) -> Vec<&'r str> {
        self.iter().map(|f| registry.display_name(f)).collect()
    }

    /// Rebuilds a working memory from a recorded sequence.
    pub(crate) fn from_sequence(sequence: im::Vector<FactId>) -> Self {
        let present = sequence.iter().copied().collect();
        Self { sequence, present }
    }
}
