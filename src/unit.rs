use crate::ast::AstNode;

/// A parsed source file ready for analysis.
///
/// The identifier is the file path as the caller wants it reported,
/// usually relative to the project root. Units are never mutated once
/// produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub id: String,
    pub root: AstNode,
}

impl SourceUnit {
    pub fn new(id: impl Into<String>, root: AstNode) -> Self {
        Self { id: id.into(), root }
    }
}
