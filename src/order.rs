//! Topological Orderer - a linear build order from the dependency graph
//!
//! Works in rounds: every waiting unit whose dependencies are all placed
//! moves to the placed list, in identifier order. A round that places
//! nothing while units are still waiting means a cycle, and ordering fails
//! instead of guessing.

use crate::graph::DependencyGraph;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Files in an order where every file comes after all its dependencies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildOrder {
    units: Vec<String>,
}

impl BuildOrder {
    /// Index of a unit in the order
    pub fn position(&self, unit: &str) -> Option<usize> {
        self.units.iter().position(|u| u == unit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.units.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.units
    }

    pub fn into_vec(self) -> Vec<String> {
        self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Check that every dependency in `graph` appears before its dependent
    pub fn satisfies(&self, graph: &DependencyGraph) -> bool {
        graph.iter().all(|(unit, deps)| {
            let Some(at) = self.position(unit) else {
                return false;
            };
            deps.iter()
                .all(|dep| self.position(dep).is_some_and(|dep_at| dep_at < at))
        })
    }
}

impl fmt::Display for BuildOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in &self.units {
            writeln!(f, "{}", unit)?;
        }
        Ok(())
    }
}

/// Order every unit of `graph` so dependencies come first.
///
/// Fails with `Error::CircularDependency` carrying the units still waiting
/// and the partial order placed before progress stopped.
pub fn order(graph: &DependencyGraph) -> Result<BuildOrder> {
    let mut placed: Vec<String> = Vec::with_capacity(graph.units().len());
    let mut placed_set: BTreeSet<&str> = BTreeSet::new();
    let mut waiting: BTreeSet<&str> = graph.units().iter().map(String::as_str).collect();
    let mut round = 0usize;

    while !waiting.is_empty() {
        round += 1;
        let ready: Vec<&str> = waiting
            .iter()
            .copied()
            .filter(|unit| {
                graph
                    .dependencies_of(unit)
                    .is_none_or(|deps| deps.iter().all(|dep| placed_set.contains(dep.as_str())))
            })
            .collect();

        if ready.is_empty() {
            return Err(Error::CircularDependency {
                waiting: waiting.iter().map(|u| u.to_string()).collect(),
                placed,
            });
        }

        tracing::debug!(round, placed = ready.len(), waiting = waiting.len() - ready.len(), "ordering round");

        for unit in ready {
            waiting.remove(unit);
            placed_set.insert(unit);
            placed.push(unit.to_string());
        }
    }

    Ok(BuildOrder { units: placed })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(units: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for unit in units {
            graph.add_unit(*unit);
        }
        for (dependent, dependency) in edges {
            graph.add_dependency(dependent, dependency);
        }
        graph
    }

    #[test]
    fn test_independent_units_in_identifier_order() {
        let graph = graph(&["c.rb", "a.rb", "b.rb"], &[]);
        let order = order(&graph).unwrap();
        assert_eq!(order.as_slice(), ["a.rb", "b.rb", "c.rb"]);
    }

    #[test]
    fn test_dependencies_come_first() {
        // app depends on model and view, view depends on model
        let graph = graph(
            &["app.rb", "model.rb", "view.rb", "util.rb"],
            &[("app.rb", "model.rb"), ("app.rb", "view.rb"), ("view.rb", "model.rb")],
        );
        let order = order(&graph).unwrap();

        assert_eq!(order.as_slice(), ["model.rb", "util.rb", "view.rb", "app.rb"]);
        assert!(order.satisfies(&graph));
    }

    #[test]
    fn test_cycle_reports_waiting_and_partial_order() {
        let graph = graph(
            &["base.rb"],
            &[("a.rb", "b.rb"), ("b.rb", "c.rb"), ("c.rb", "a.rb"), ("a.rb", "base.rb")],
        );

        match order(&graph) {
            Err(Error::CircularDependency { waiting, placed }) => {
                assert_eq!(waiting, vec!["a.rb", "b.rb", "c.rb"]);
                assert_eq!(placed, vec!["base.rb"]);
            }
            other => panic!("expected a circular dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_dependent_of_cycle_keeps_waiting() {
        let graph = graph(&[], &[("a.rb", "b.rb"), ("b.rb", "a.rb"), ("z.rb", "a.rb")]);
        let err = order(&graph).unwrap_err();
        assert!(matches!(err, Error::CircularDependency { ref waiting, .. } if waiting.len() == 3));
    }

    #[test]
    fn test_empty_graph() {
        assert!(order(&DependencyGraph::new()).unwrap().is_empty());
    }
}
