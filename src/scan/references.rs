//! Scoped references and the expressions that carry them

use super::definitions::body_statements;
use super::scanner::FileScan;
use crate::Result;
use crate::ast::{AstNode, Child, NodeKind};
use crate::symbol::SEPARATOR;
use serde::Serialize;
use std::fmt;

/// A constant mentioned by a file, together with where it was mentioned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "anchor", rename_all = "lowercase")]
pub enum ScopedReference {
    /// Looked up through the enclosing namespaces.
    ///
    /// `scope` lists the enclosing class/module names of the same file,
    /// outermost first. `name` may itself be qualified (`Foo::Bar`).
    Lexical { name: String, scope: Vec<String> },
    /// `::Name` - looked up among top-level definitions only
    Root { name: String },
}

impl ScopedReference {
    /// A reference at the current level (empty scope path)
    pub fn lexical(name: impl Into<String>) -> Self {
        ScopedReference::Lexical {
            name: name.into(),
            scope: Vec::new(),
        }
    }

    pub fn root(name: impl Into<String>) -> Self {
        ScopedReference::Root { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            ScopedReference::Lexical { name, .. } | ScopedReference::Root { name } => name,
        }
    }

    /// Enclosing namespaces, outermost first (always empty for root references)
    pub fn scope(&self) -> &[String] {
        match self {
            ScopedReference::Lexical { scope, .. } => scope,
            ScopedReference::Root { .. } => &[],
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, ScopedReference::Root { .. })
    }

    /// The same reference seen from one namespace further out.
    ///
    /// Root references are unaffected by nesting.
    pub fn nested_in(self, namespace: &str) -> Self {
        match self {
            ScopedReference::Lexical { name, mut scope } => {
                scope.insert(0, namespace.to_string());
                ScopedReference::Lexical { name, scope }
            }
            root => root,
        }
    }

    /// Extend the referenced name with one more segment (`Foo` → `Foo::Bar`)
    pub fn qualified(self, segment: &str) -> Self {
        match self {
            ScopedReference::Lexical { name, scope } => ScopedReference::Lexical {
                name: format!("{name}{SEPARATOR}{segment}"),
                scope,
            },
            ScopedReference::Root { name } => ScopedReference::Root {
                name: format!("{name}{SEPARATOR}{segment}"),
            },
        }
    }

    /// Name as written in source; root references keep their leading `::`
    pub fn written_name(&self) -> String {
        match self {
            ScopedReference::Lexical { name, .. } => name.clone(),
            ScopedReference::Root { name } => format!("{SEPARATOR}{name}"),
        }
    }
}

impl fmt::Display for ScopedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopedReference::Lexical { name, scope } if !scope.is_empty() => {
                write!(f, "{} (in {})", name, scope.join(SEPARATOR))
            }
            other => write!(f, "{}", other.written_name()),
        }
    }
}

/// Reference named by a pure constant chain (`Foo`, `::Foo`, `Foo::Bar`)
fn constant_chain(node: &AstNode) -> Option<ScopedReference> {
    match node.kind {
        NodeKind::VarRef => node.node(0).and_then(AstNode::const_name).map(ScopedReference::lexical),
        NodeKind::TopConstRef => node.node(0).and_then(AstNode::const_name).map(ScopedReference::root),
        NodeKind::ConstPathRef => {
            let segment = node.node(1).and_then(AstNode::const_name)?;
            constant_chain(node.node(0)?).map(|prefix| prefix.qualified(segment))
        }
        _ => None,
    }
}

/// Does any `@const` token appear under `node`?
pub(super) fn mentions_constant(node: &AstNode) -> bool {
    node.kind == NodeKind::Const || node.children.iter().any(child_mentions_constant)
}

fn child_mentions_constant(child: &Child) -> bool {
    match child {
        Child::Node(node) => mentions_constant(node),
        Child::List(items) => items.iter().any(child_mentions_constant),
        _ => false,
    }
}

impl FileScan<'_> {
    /// Every constant an expression mentions, all at the current level
    pub(super) fn expression_references(&mut self, node: &AstNode) -> Result<Vec<ScopedReference>> {
        match &node.kind {
            NodeKind::VarRef | NodeKind::TopConstRef => Ok(constant_chain(node).into_iter().collect()),
            NodeKind::ConstPathRef => self.const_path_references(node),
            NodeKind::Call => self.child_references(node.child(0)),
            NodeKind::MethodAddArg | NodeKind::MethodAddBlock | NodeKind::Assign => {
                self.children_references(node, &[0, 1])
            }
            NodeKind::OpAssign => self.children_references(node, &[0, 2]),
            NodeKind::Command => self.child_references(node.child(1)),
            NodeKind::CommandCall => self.children_references(node, &[0, 3]),
            NodeKind::Array | NodeKind::ArgParen | NodeKind::ArgsAddBlock | NodeKind::Paren => {
                self.child_references(node.child(0))
            }
            NodeKind::BraceBlock | NodeKind::DoBlock => self.statement_references(body_statements(node, 1)),
            NodeKind::BodyStmt => self.statement_references(body_statements(node, 0)),
            // Method and singleton-class bodies do not open a namespace
            NodeKind::Def => self.statement_references(body_statements(node, 2)),
            NodeKind::Defs => self.statement_references(body_statements(node, 4)),
            NodeKind::SClass => self.statement_references(body_statements(node, 1)),
            // The superclass is looked up from the scope enclosing the class
            NodeKind::Class => self.child_references(node.child(1)),
            NodeKind::Module
            | NodeKind::Program
            | NodeKind::ConstRef
            | NodeKind::VarField
            | NodeKind::ConstPathField
            | NodeKind::TopConstField
            | NodeKind::BlockVar
            | NodeKind::Params
            | NodeKind::Fcall
            | NodeKind::Vcall
            | NodeKind::Field
            | NodeKind::Aref
            | NodeKind::Binary
            | NodeKind::Unary
            | NodeKind::Return
            | NodeKind::StringLiteral
            | NodeKind::SymbolLiteral
            | NodeKind::VoidStmt
            | NodeKind::Const
            | NodeKind::Ident
            | NodeKind::Kw
            | NodeKind::Int
            | NodeKind::Token(_) => Ok(Vec::new()),
            NodeKind::If
            | NodeKind::IfMod
            | NodeKind::Unless
            | NodeKind::UnlessMod
            | NodeKind::While
            | NodeKind::Until
            | NodeKind::Case
            | NodeKind::Begin => {
                self.skipped_control_flow(node);
                Ok(Vec::new())
            }
            NodeKind::Unknown(_) => {
                self.unrecognized(node)?;
                Ok(Vec::new())
            }
        }
    }

    /// `Left::Name`: one qualified reference when the left side is itself a
    /// constant chain, otherwise whatever the left side mentions plus `Name`.
    fn const_path_references(&mut self, node: &AstNode) -> Result<Vec<ScopedReference>> {
        if let Some(reference) = constant_chain(node) {
            return Ok(vec![reference]);
        }

        let mut references = self.child_references(node.child(0))?;
        if let Some(segment) = node.node(1).and_then(AstNode::const_name) {
            references.push(ScopedReference::lexical(segment));
        }
        Ok(references)
    }

    fn child_references(&mut self, child: Option<&Child>) -> Result<Vec<ScopedReference>> {
        match child {
            Some(Child::Node(node)) => self.expression_references(node),
            Some(Child::List(items)) => self.statement_references(items),
            _ => Ok(Vec::new()),
        }
    }

    fn children_references(&mut self, node: &AstNode, indices: &[usize]) -> Result<Vec<ScopedReference>> {
        let mut references = Vec::new();
        for &index in indices {
            references.extend(self.child_references(node.child(index))?);
        }
        Ok(references)
    }

    fn statement_references(&mut self, items: &[Child]) -> Result<Vec<ScopedReference>> {
        let mut references = Vec::new();
        for item in items {
            references.extend(self.child_references(Some(item))?);
        }
        Ok(references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_in_prepends_outermost_last() {
        let reference = ScopedReference::lexical("Limit").nested_in("Inner").nested_in("Outer");
        assert_eq!(reference.scope(), ["Outer".to_string(), "Inner".to_string()]);
        assert_eq!(reference.to_string(), "Limit (in Outer::Inner)");
    }

    #[test]
    fn test_root_reference_ignores_nesting() {
        let reference = ScopedReference::root("Config").nested_in("App");
        assert!(reference.is_root());
        assert!(reference.scope().is_empty());
        assert_eq!(reference.written_name(), "::Config");
    }

    #[test]
    fn test_qualified() {
        let reference = ScopedReference::lexical("Foo").qualified("Bar");
        assert_eq!(reference.name(), "Foo::Bar");
        let root = ScopedReference::root("Foo").qualified("Bar");
        assert_eq!(root.written_name(), "::Foo::Bar");
    }

    #[test]
    fn test_mentions_constant() {
        let guarded = crate::ast::decode(&serde_json::json!(
            ["if", ["var_ref", ["@ident", "ready", [1, 3]]],
                [["var_ref", ["@const", "Board", [2, 2]]]], null]
        ))
        .unwrap();
        assert!(mentions_constant(guarded.as_node().unwrap()));

        let plain = crate::ast::decode(&serde_json::json!(
            ["while", ["var_ref", ["@ident", "ready", [1, 6]]], [["void_stmt"]]]
        ))
        .unwrap();
        assert!(!mentions_constant(plain.as_node().unwrap()));
    }
}
