use super::external::ExternalReferenceLog;
use crate::graph::DependencyGraph;
use crate::scan::ScopedReference;
use crate::scope::ReferenceResolver;
use crate::symbol::SymbolTable;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    /// References resolved to another file
    pub resolved: usize,
    /// References resolved to the referencing file itself
    pub local: usize,
    /// References with no owner in the analyzed set
    pub external: usize,
    pub total: usize,
}

impl fmt::Display for LinkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dependency Linker Stats:")?;
        writeln!(f, "  Total References: {}", self.total)?;
        writeln!(f, "  ✅ Resolved: {}", self.resolved)?;
        writeln!(f, "  🏠 Local: {}", self.local)?;
        writeln!(f, "  🌍 External: {}", self.external)
    }
}

/// Output of a linking pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct Linked {
    pub graph: DependencyGraph,
    pub externals: ExternalReferenceLog,
    pub stats: LinkStats,
}

/// Builds the file dependency graph from every file's references.
///
/// Read-only over a finished symbol table; the same input always yields
/// the same graph.
pub struct DependencyLinker<'a> {
    resolver: ReferenceResolver<'a>,
}

impl<'a> DependencyLinker<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            resolver: ReferenceResolver::new(symbols),
        }
    }

    /// Link `(unit, references)` pairs into a dependency graph
    pub fn link<'u, I>(&self, units: I) -> Linked
    where
        I: IntoIterator<Item = (&'u str, &'u [ScopedReference])>,
    {
        let mut linked = Linked::default();

        for (unit, references) in units {
            linked.graph.add_unit(unit);

            for reference in references {
                linked.stats.total += 1;
                match self.resolver.resolve(reference) {
                    Some(owner) if owner == unit => linked.stats.local += 1,
                    Some(owner) => {
                        linked.stats.resolved += 1;
                        linked.graph.add_dependency(unit, owner);
                    }
                    None => {
                        linked.stats.external += 1;
                        tracing::debug!(unit, reference = %reference, "external reference");
                        linked.externals.record(reference.written_name(), unit);
                    }
                }
            }
        }

        linked
    }
}
