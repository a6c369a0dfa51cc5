//! Fact registry: vocabulary validation and fact interning.
//!
//! A [`FactRegistry`] owns a closed vocabulary of fact names and hands out one
//! interned [`Fact`] per name. Registries are ordinary values; independent runs
//! in the same process simply use independent registries.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fact::{Fact, FactId, RegistryId};

// =============================================================================
// Vocabulary
// =============================================================================

/// Ordered set of registered fact names.
///
/// Cloning is O(1) and yields an independent snapshot; effects receive one so
/// they can inspect the vocabulary without being able to change it.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "im::Vector<Arc<str>>", into = "im::Vector<Arc<str>>")
)]
pub struct Vocabulary {
    names: im::Vector<Arc<str>>,
    /// Membership index over `names`.
    index: im::HashSet<Arc<str>>,
}

impl Vocabulary {
    /// Builds a vocabulary from names, skipping duplicates.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::default();
        for name in names {
            vocabulary.insert(name.as_ref());
        }
        vocabulary
    }

    /// Appends `name` unless it is already present. Returns true if added.
    pub(crate) fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        let name: Arc<str> = name.into();
        self.index.insert(Arc::clone(&name));
        self.names.push_back(name);
        true
    }

    /// Returns the number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no names are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns true if `name` is part of the vocabulary.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Returns the name at `index`, in registration order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(AsRef::as_ref)
    }

    /// Iterates over names in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(AsRef::as_ref)
    }

    /// Copies the names into owned strings.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

impl From<im::Vector<Arc<str>>> for Vocabulary {
    fn from(names: im::Vector<Arc<str>>) -> Self {
        Self::from_names(names.iter())
    }
}

impl From<Vocabulary> for im::Vector<Arc<str>> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.names
    }
}

impl fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// =============================================================================
// Fact Registry
// =============================================================================

/// Validates fact names and interns one [`Fact`] per name.
pub struct FactRegistry {
    id: RegistryId,
    vocabulary: Vocabulary,
    /// Interned facts, indexed by `FactId::index`.
    facts: Vec<Fact>,
    by_name: HashMap<Arc<str>, FactId>,
}

impl FactRegistry {
    /// Creates a registry with an empty vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: RegistryId::next(),
            vocabulary: Vocabulary::default(),
            facts: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Creates a registry and registers `names`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any name is blank.
    pub fn with_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        registry.register(names)?;
        Ok(registry)
    }

    /// Returns this registry's id.
    #[must_use]
    pub const fn id(&self) -> RegistryId {
        self.id
    }

    /// Adds names to the vocabulary.
    ///
    /// Names are trimmed. Names already present are ignored. Nothing is added
    /// if any name is invalid. Returns the number of names actually added.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any name is empty or whitespace.
    pub fn register<I, S>(&mut self, names: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted: Vec<String> = Vec::new();
        for name in names {
            let raw = name.as_ref();
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(Error::invalid_name(raw));
            }
            accepted.push(trimmed.to_string());
        }

        let before = self.vocabulary.len();
        for name in accepted {
            self.vocabulary.insert(&name);
        }
        Ok(self.vocabulary.len() - before)
    }

    /// Returns the interned fact for `name`, creating it on first request.
    ///
    /// # Errors
    ///
    /// Returns a lookup error naming `name` if it is not in the vocabulary.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` facts are interned.
    pub fn get(&mut self, name: &str) -> Result<FactId> {
        let name = name.trim();
        if let Some(&id) = self.by_name.get(name) {
            return Ok(id);
        }
        if !self.vocabulary.contains(name) {
            return Err(Error::unknown_fact(name));
        }

        let index = u32::try_from(self.facts.len()).expect("too many interned facts");
        let id = FactId::new(self.id, index);
        let name: Arc<str> = name.into();
        self.facts.push(Fact::new(id, Arc::clone(&name)));
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Interns every name in `names`, in order.
    ///
    /// # Errors
    ///
    /// Returns a lookup error for the first name outside the vocabulary.
    pub fn get_all<I, S>(&mut self, names: I) -> Result<Vec<FactId>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|n| self.get(n.as_ref())).collect()
    }

    /// Returns the fact for `name` if it has already been interned.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<FactId> {
        self.by_name.get(name.trim()).copied()
    }

    /// Returns the interned fact for `name` for configuration.
    ///
    /// # Errors
    ///
    /// Returns a lookup error naming `name` if it is not in the vocabulary.
    pub fn fact_mut(&mut self, name: &str) -> Result<&mut Fact> {
        let id = self.get(name)?;
        Ok(&mut self.facts[id.index() as usize])
    }

    /// Returns the fact behind a handle issued by this registry.
    #[must_use]
    pub fn fact(&self, id: FactId) -> Option<&Fact> {
        if id.registry() != self.id {
            return None;
        }
        self.facts.get(id.index() as usize)
    }

    /// Returns the name behind a handle issued by this registry.
    #[must_use]
    pub fn name(&self, id: FactId) -> Option<&str> {
        self.fact(id).map(Fact::name)
    }

    /// Returns the name behind `id`, or `"?"` for foreign handles.
    #[must_use]
    pub fn display_name(&self, id: FactId) -> &str {
        self.name(id).unwrap_or("?")
    }

    /// Checks that `id` was issued by this registry.
    ///
    /// # Errors
    ///
    /// Returns a validation error for handles from another registry.
    pub fn check(&self, id: FactId) -> Result<()> {
        if self.fact(id).is_some() {
            Ok(())
        } else {
            Err(Error::foreign_fact(id, self.id))
        }
    }

    /// Runs the effect of `id` and returns how many invocations ran.
    ///
    /// Foreign handles are ignored.
    pub fn perform(&mut self, id: FactId) -> u32 {
        if id.registry() != self.id {
            return 0;
        }
        match self.facts.get_mut(id.index() as usize) {
            Some(fact) => fact.perform(&self.vocabulary),
            None => 0,
        }
    }

    /// Returns a snapshot of the vocabulary.
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Returns the number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Returns true if `name` is in the vocabulary.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.vocabulary.contains(name.trim())
    }

    /// Returns the number of interned facts.
    #[must_use]
    pub fn interned_count(&self) -> usize {
        self.facts.len()
    }

    /// Iterates over the interned facts in interning order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }
}

impl Default for FactRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FactRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactRegistry")
            .field("id", &self.id)
            .field("vocabulary", &self.vocabulary)
            .field("interned", &self.facts.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
