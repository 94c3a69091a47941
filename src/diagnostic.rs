//! Diagnostics - recoverable problems found while analyzing
//!
//! Nothing here stops a run. Diagnostics are collected per file during
//! scanning and per symbol while merging the symbol table, logged through
//! `tracing`, and handed back to the caller for display.

use crate::ast::Position;
use serde::Serialize;
use std::fmt;

/// Category of a recoverable problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The scanner met a node kind it cannot classify
    UnrecognizedNode,
    /// A class or module node is missing a usable name
    MalformedDefinition,
    /// Two files define the same fully-qualified path
    DuplicateDefinition,
    /// A control-flow construct holding constants was not looked into
    SkippedControlFlow,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::UnrecognizedNode => "unrecognized-node",
            DiagnosticKind::MalformedDefinition => "malformed-definition",
            DiagnosticKind::DuplicateDefinition => "duplicate-definition",
            DiagnosticKind::SkippedControlFlow => "skipped-control-flow",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single diagnostic attached to a source unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Identifier of the unit the problem was found in
    pub unit: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            unit: unit.into(),
            message: message.into(),
            position: None,
        }
    }

    /// Attach a source position
    pub fn at(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{}:{}: [{}] {}", self.unit, pos, self.kind, self.message),
            None => write!(f, "{}: [{}] {}", self.unit, self.kind, self.message),
        }
    }
}
