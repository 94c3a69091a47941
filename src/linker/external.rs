use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Constants referenced but never defined by any analyzed file.
///
/// Keyed by the name as written (root-anchored names keep their leading
/// `::`), each with the files that referenced it. These are expected for
/// anything the runtime or a library provides, and never affect ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExternalReferenceLog {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl ExternalReferenceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>, unit: impl Into<String>) {
        self.entries.entry(name.into()).or_default().insert(unit.into());
    }

    /// Files that referenced `name` without finding an owner
    pub fn referencing_units(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.entries.iter()
    }

    /// Number of distinct unresolved names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
