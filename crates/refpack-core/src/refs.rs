//! The per-run registry of loaded documents.
//!
//! Invariants:
//! - a location is loaded at most once per run; the entry map is keyed by
//!   canonical location
//! - insertion order is discovery order, and `paths()` enumerates it
//! - `circular` / `circular_refs` are run-scoped cycle metadata: written
//!   once per discovered cycle edge, read many times, and kept valid even
//!   when the surrounding call fails

use indexmap::IndexMap;
use serde_json::Value;

use crate::location::{Location, LocationKind};

/// One successfully loaded document.
#[derive(Debug, Clone)]
pub struct RefEntry {
    pub location: Location,
    /// The decoded tree value (root of this document).
    pub value: Value,
    /// The original raw payload, kept for error reporting.
    pub raw: Vec<u8>,
    /// True iff a cycle was found that involves this document.
    pub circular: bool,
    /// Name of the reader plugin that fetched this document, when one ran.
    pub reader: Option<String>,
    /// Name of the parser plugin that decoded this document, when one ran.
    pub parser: Option<String>,
}

/// All documents loaded during one top-level resolution run.
#[derive(Debug, Clone, Default)]
pub struct Refs {
    entries: IndexMap<String, RefEntry>,
    /// True iff any cycle was found anywhere in the run.
    pub circular: bool,
    /// One canonical `location#/path` string per distinct cycle edge, in
    /// discovery order.
    pub circular_refs: Vec<String>,
}

impl Refs {
    pub fn new() -> Refs {
        Refs::default()
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.entries.contains_key(&location.key())
    }

    /// Insert a freshly loaded entry. Keeps the first entry on a duplicate
    /// key, preserving the exact-once guarantee.
    pub fn insert(&mut self, entry: RefEntry) {
        self.entries.entry(entry.location.key()).or_insert(entry);
    }

    pub fn get(&self, location: &Location) -> Option<&RefEntry> {
        self.entries.get(&location.key())
    }

    pub fn get_mut(&mut self, location: &Location) -> Option<&mut RefEntry> {
        self.entries.get_mut(&location.key())
    }

    /// The entry the run started from (first discovered).
    pub fn root(&self) -> Option<&RefEntry> {
        self.entries.values().next()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RefEntry> {
        self.entries.values()
    }

    /// Canonical locations in discovery order, optionally filtered by kind
    /// (an empty filter returns everything).
    pub fn paths(&self, kinds: &[LocationKind]) -> Vec<String> {
        self.entries
            .values()
            .filter(|entry| kinds.is_empty() || kinds.contains(&entry.location.kind()))
            .map(|entry| entry.location.key())
            .collect()
    }

    /// Record one cycle edge: flags the owning entry and the run, and
    /// appends the closing pointer's path exactly once.
    pub fn mark_circular(&mut self, location: &Location, pointer_path: String) {
        self.circular = true;
        if let Some(entry) = self.get_mut(location) {
            entry.circular = true;
        }
        if !self.circular_refs.contains(&pointer_path) {
            self.circular_refs.push(pointer_path);
        }
    }
}
