//! # Buildorder - static build ordering for Ruby sources
//!
//! Works out which files must be compiled before which others without any
//! `require` statements, purely from the constants each file defines and
//! the constants it references.
//!
//! Buildorder provides:
//! - A scanner over Ripper-style ASTs that finds constant definitions and
//!   scoped references
//! - A global symbol table mapping qualified constant paths to files
//! - A resolver reproducing the constant search order used for linking
//! - A file dependency graph with a reachability (cycle) oracle
//! - A round-based topological orderer with cycle reporting

pub mod ast;
pub mod unit;
pub mod diagnostic;
pub mod scan;
pub mod symbol;
pub mod scope;
pub mod graph;
pub mod linker;
pub mod order;
pub mod analysis;
pub mod adapter;
pub mod project;
pub mod ignore;
pub mod config;
pub mod output;
pub mod ui;


// Re-exports for convenient access
pub use ast::{AstNode, NodeKind};
pub use unit::SourceUnit;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use scan::{DefinitionTree, ScanResult, Scanner, ScopedReference};
pub use symbol::SymbolTable;
pub use graph::DependencyGraph;
pub use linker::ExternalReferenceLog;
pub use order::{BuildOrder, order};
pub use analysis::{Analysis, Analyzer};

/// Result type alias for Buildorder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Buildorder operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Unrecognized node `{kind}` in {unit}")]
    UnrecognizedNode { unit: String, kind: String },

    #[error("Circular dependency found among {} file(s): {}", waiting.len(), waiting.join(", "))]
    CircularDependency {
        /// Units that could not be placed
        waiting: Vec<String>,
        /// Partial order placed before progress stopped
        placed: Vec<String>,
    },

    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    #[error("Scan worker failed: {0}")]
    Worker(String),
}

/// Message sent from parallel scan workers to the coordinator
#[derive(Debug)]
pub enum ScanMessage {
    Scanned {
        index: usize,
        unit: String,
        result: Box<ScanResult>,
    },
    Failed {
        index: usize,
        unit: String,
        error: Error,
    },
}
