//! Dependency Graph - which files depend on which
//!
//! Maps each file to the set of files defining constants it references.
//! Files without dependencies are left out of the map but stay listed in
//! the graph's unit set, so ordering still places them.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// File-level dependency graph.
///
/// Invariants: a unit never depends on itself, and units with an empty
/// dependency set are absent from the dependency map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    /// Every analyzed unit
    units: BTreeSet<String>,
    /// unit → units it depends on
    dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit, with or without dependencies
    pub fn add_unit(&mut self, unit: impl Into<String>) {
        self.units.insert(unit.into());
    }

    /// Record that `dependent` must come after `dependency`.
    ///
    /// Self-dependencies are ignored. Both ends become known units.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        self.units.insert(dependent.to_string());
        self.units.insert(dependency.to_string());
        if dependent == dependency {
            return;
        }
        self.dependencies
            .entry(dependent.to_string())
            .or_default()
            .insert(dependency.to_string());
    }

    /// Dependencies of a unit; `None` means no known dependency
    pub fn dependencies_of(&self, unit: &str) -> Option<&BTreeSet<String>> {
        self.dependencies.get(unit)
    }

    /// Units that depend directly on `unit`
    pub fn dependents_of(&self, unit: &str) -> Vec<&str> {
        self.dependencies
            .iter()
            .filter(|(_, deps)| deps.contains(unit))
            .map(|(dependent, _)| dependent.as_str())
            .collect()
    }

    pub fn contains_unit(&self, unit: &str) -> bool {
        self.units.contains(unit)
    }

    pub fn units(&self) -> &BTreeSet<String> {
        &self.units
    }

    /// Iterate `(unit, dependencies)` for units that have any
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.dependencies.iter()
    }

    /// Number of units with at least one dependency
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.dependencies.values().map(BTreeSet::len).sum()
    }

    /// Check whether `to` can be reached from `from` by following
    /// dependencies.
    ///
    /// Only `from`'s dependencies are walked, so `reachable(g, a, a)` is
    /// true exactly when `a` sits on a cycle. Units already visited are
    /// skipped, which keeps the walk finite on cyclic graphs.
    pub fn reachable(&self, from: &str, to: &str) -> bool {
        let mut visited = BTreeSet::new();
        self.reachable_from(from, to, &mut visited)
    }

    fn reachable_from<'a>(&'a self, from: &str, to: &str, visited: &mut BTreeSet<&'a str>) -> bool {
        let Some(deps) = self.dependencies.get(from) else {
            return false;
        };

        for dep in deps {
            if dep == to {
                return true;
            }
            if visited.insert(dep.as_str()) && self.reachable_from(dep, to, visited) {
                return true;
            }
        }
        false
    }

    /// Would making `dependent` depend on `dependency` close a cycle?
    pub fn would_create_cycle(&self, dependent: &str, dependency: &str) -> bool {
        dependent == dependency || self.reachable(dependency, dependent)
    }

    /// One concrete cycle through the given units, if any.
    ///
    /// Returned as a path `[a, b, .., a]` where each unit depends on the
    /// next. Used to explain a failed ordering.
    pub fn find_cycle(&self, among: &BTreeSet<String>) -> Option<Vec<String>> {
        let mut finished = BTreeSet::new();
        for start in self.units.iter().filter(|u| among.contains(*u)) {
            let mut path = Vec::new();
            if let Some(cycle) = self.cycle_from(start, among, &mut path, &mut finished) {
                return Some(cycle);
            }
        }
        None
    }

    fn cycle_from<'a>(
        &'a self,
        unit: &'a str,
        among: &BTreeSet<String>,
        path: &mut Vec<&'a str>,
        finished: &mut BTreeSet<&'a str>,
    ) -> Option<Vec<String>> {
        if let Some(at) = path.iter().position(|u| *u == unit) {
            let mut cycle: Vec<String> = path[at..].iter().map(|u| u.to_string()).collect();
            cycle.push(unit.to_string());
            return Some(cycle);
        }
        if finished.contains(unit) {
            return None;
        }

        path.push(unit);
        if let Some(deps) = self.dependencies.get(unit) {
            for dep in deps.iter().filter(|d| among.contains(*d)) {
                if let Some(cycle) = self.cycle_from(dep, among, path, finished) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        finished.insert(unit);
        None
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            units: self.units.len(),
            dependent_units: self.dependencies.len(),
            edges: self.edge_count(),
        }
    }
}

/// Statistics about a dependency graph
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub units: usize,
    pub dependent_units: usize,
    pub edges: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dependency Graph Statistics:")?;
        writeln!(f, "  Files: {}", self.units)?;
        writeln!(f, "  Files with dependencies: {}", self.dependent_units)?;
        writeln!(f, "  Edges: {}", self.edges)
    }
}
