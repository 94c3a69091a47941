//! Symbol table - fully-qualified constant paths mapped to their owning file
//!
//! Paths are root-anchored and `::`-joined: `module App; class View` in
//! `app/view.rb` yields `::App → app/view.rb` and `::App::View →
//! app/view.rb`.

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::scan::DefinitionTree;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Namespace separator used in qualified paths
pub const SEPARATOR: &str = "::";

/// Join a prefix and a name into a qualified path.
///
/// An empty prefix stands for the top-level namespace, so
/// `qualify("", "Foo")` is `::Foo`.
pub fn qualify(prefix: &str, name: &str) -> String {
    format!("{prefix}{SEPARATOR}{name}")
}

/// Flatten one file's definition tree into `(path, unit)` entries,
/// parents before their children.
pub fn flatten(unit: &str, tree: &DefinitionTree, prefix: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    flatten_into(unit, tree, prefix, &mut entries);
    entries
}

fn flatten_into(unit: &str, tree: &DefinitionTree, prefix: &str, entries: &mut Vec<(String, String)>) {
    for (name, nested) in tree.iter() {
        let path = qualify(prefix, name);
        entries.push((path.clone(), unit.to_string()));
        flatten_into(unit, nested, &path, entries);
    }
}

/// Global mapping from qualified path to the single file that owns it.
///
/// When several files define the same path the last one added wins, and
/// the collision is recorded as a duplicate-definition diagnostic. Every
/// contributing file is still remembered for inspection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    owners: BTreeMap<String, String>,
    #[serde(skip)]
    contributors: BTreeMap<String, BTreeSet<String>>,
    #[serde(skip)]
    diagnostics: Vec<Diagnostic>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one file's definitions into the table
    pub fn add_unit(&mut self, unit: &str, tree: &DefinitionTree) {
        for (path, owner) in flatten(unit, tree, "") {
            self.insert(path, owner);
        }
    }

    /// Record `path` as owned by `unit`, replacing any previous owner
    pub fn insert(&mut self, path: String, unit: String) {
        self.contributors
            .entry(path.clone())
            .or_default()
            .insert(unit.clone());

        if let Some(previous) = self.owners.insert(path.clone(), unit.clone()) {
            if previous != unit {
                let diagnostic = Diagnostic::new(
                    DiagnosticKind::DuplicateDefinition,
                    unit,
                    format!("{} is also defined in {}; the later definition wins", path, previous),
                );
                tracing::warn!("{}", diagnostic);
                self.diagnostics.push(diagnostic);
            }
        }
    }

    /// File owning a qualified path
    pub fn owner(&self, path: &str) -> Option<&str> {
        self.owners.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.owners.contains_key(path)
    }

    /// Every file that defines `path`, including overridden ones
    pub fn contributors(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.contributors.get(path)
    }

    /// Duplicate-definition diagnostics, in the order they were found
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate `(path, owner)` pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.owners.iter().map(|(path, owner)| (path.as_str(), owner.as_str()))
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
