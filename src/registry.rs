//! Explicit registry for canvases shared between logical owners.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::{HarnessError, Result};

/// Values keyed by a caller-chosen string id.
///
/// Callers pick the duplicate policy per call: [`CanvasRegistry::insert`]
/// rejects a taken id, [`CanvasRegistry::insert_or_warn`] keeps the existing
/// entry and logs.
#[derive(Debug)]
pub struct CanvasRegistry<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for CanvasRegistry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> CanvasRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: T) -> Result<&mut T> {
        match self.entries.entry(id.into()) {
            Entry::Occupied(entry) => Err(HarnessError::DuplicateId(entry.key().clone())),
            Entry::Vacant(entry) => Ok(entry.insert(value)),
        }
    }

    /// Returns the entry for `id`, creating it from `value` only when absent.
    /// A collision drops `value` and is logged as a warning.
    pub fn insert_or_warn(&mut self, id: impl Into<String>, value: T) -> &mut T {
        match self.entries.entry(id.into()) {
            Entry::Occupied(entry) => {
                tracing::warn!(id = %entry.key(), "id already registered; reusing existing entry");
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(value),
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.entries.remove(id)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (String, T)> + '_ {
        self.entries.drain()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
