//! Facts and their interned handles.
//!
//! A [`Fact`] lives in exactly one [`FactRegistry`](crate::FactRegistry) and is
//! referred to everywhere else by its [`FactId`]. Two handles are equal if and
//! only if they denote the same interned fact, so membership tests in rules
//! and working memory are identity tests.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::Vocabulary;

static NEXT_REGISTRY: AtomicU64 = AtomicU64::new(0);

/// Identifies the registry that issued a [`FactId`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegistryId(u64);

impl RegistryId {
    /// Allocates an id no other registry in this process has used.
    pub(crate) fn next() -> Self {
        Self(NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value of this id.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegistryId({})", self.0)
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registry #{}", self.0)
    }
}

/// Interned fact handle.
///
/// Cheap to copy and compare. Carries the id of the issuing registry so that
/// handles mixed up between independent runs are caught at construction time.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactId {
    registry: RegistryId,
    index: u32,
}

impl FactId {
    pub(crate) const fn new(registry: RegistryId, index: u32) -> Self {
        Self { registry, index }
    }

    /// Returns the index of this fact in its registry's fact table.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the registry that issued this handle.
    #[must_use]
    pub const fn registry(self) -> RegistryId {
        self.registry
    }
}

impl fmt::Debug for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactId({}:{})", self.registry.0, self.index)
    }
}

/// Side effect attached to a fact.
///
/// Receives the fact's name and a read-only snapshot of the vocabulary.
pub type Effect = Box<dyn FnMut(&str, &Vocabulary)>;

/// A named piece of asserted knowledge.
pub struct Fact {
    id: FactId,
    name: Arc<str>,
    repeat: u32,
    effect: Option<Effect>,
}

impl Fact {
    pub(crate) fn new(id: FactId, name: Arc<str>) -> Self {
        Self {
            id,
            name,
            repeat: 1,
            effect: None,
        }
    }

    /// Returns the interned handle for this fact.
    #[must_use]
    pub const fn id(&self) -> FactId {
        self.id
    }

    /// Returns the fact's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns how many times the effect runs per firing.
    #[must_use]
    pub const fn repeat(&self) -> u32 {
        self.repeat
    }

    /// Returns true if an effect is attached.
    #[must_use]
    pub fn has_effect(&self) -> bool {
        self.effect.is_some()
    }

    /// Attaches or replaces the side effect.
    pub fn with_effect<F>(&mut self, effect: F) -> &mut Self
    where
        F: FnMut(&str, &Vocabulary) + 'static,
    {
        self.effect = Some(Box::new(effect));
        self
    }

    /// Detaches the side effect, if any.
    pub fn without_effect(&mut self) -> &mut Self {
        self.effect = None;
        self
    }

    /// Sets how many times the effect runs when this fact is concluded.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `count` is zero.
    pub fn with_repeat(&mut self, count: u32) -> Result<&mut Self> {
        if count == 0 {
            return Err(Error::invalid_repeat(self.name()));
        }
        self.repeat = count;
        Ok(self)
    }

    /// Runs the effect `repeat` times and returns how many invocations ran.
    ///
    /// Every invocation sees the same snapshot of `vocabulary`.
    pub fn perform(&mut self, vocabulary: &Vocabulary) -> u32 {
        let Some(effect) = self.effect.as_mut() else {
            return 0;
        };
        let name: &str = &self.name;
        let snapshot = vocabulary.clone();
        for _ in 0..self.repeat {
            effect(name, &snapshot);
        }
        self.repeat
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fact")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("repeat", &self.repeat)
            .field("effect", &self.effect.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
