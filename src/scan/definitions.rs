//! Definition trees and the node shapes that define constants

use crate::ast::{AstNode, Child, NodeKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Lexical nesting of the constants one file defines.
///
/// Each key is a name unique within its level; the value holds whatever
/// that namespace defines in turn (empty for plain constants and for
/// classes without nested definitions).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DefinitionTree {
    entries: BTreeMap<String, DefinitionTree>,
}

impl DefinitionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with its nested definitions.
    ///
    /// Reopening a namespace already present at this level merges the two
    /// nested trees instead of replacing the first.
    pub fn insert(&mut self, name: impl Into<String>, nested: DefinitionTree) {
        self.entries.entry(name.into()).or_default().merge(nested);
    }

    /// Register a constant with no nested definitions
    pub fn insert_leaf(&mut self, name: impl Into<String>) {
        self.entries.entry(name.into()).or_default();
    }

    /// Fold another tree into this one
    pub fn merge(&mut self, other: DefinitionTree) {
        for (name, nested) in other.entries {
            self.insert(name, nested);
        }
    }

    pub fn get(&self, name: &str) -> Option<&DefinitionTree> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate over `(name, nested)` pairs at this level
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DefinitionTree)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count every definition at every level
    pub fn total(&self) -> usize {
        self.entries.values().map(|nested| 1 + nested.total()).sum()
    }
}

/// Name of a `class`/`module` node.
///
/// Only a plain `const_ref` name is accepted. `class Foo::Bar` and other
/// shapes are reported back as the reason the definition is skipped.
pub fn namespace_name(node: &AstNode) -> Result<&str, String> {
    let name = node
        .node(0)
        .ok_or_else(|| format!("`{}` node has no name", node.kind))?;

    if name.kind != NodeKind::ConstRef {
        return Err(format!("`{}` name is a `{}`, not a const_ref", node.kind, name.kind));
    }

    name.node(0)
        .and_then(AstNode::const_name)
        .ok_or_else(|| format!("`{}` const_ref does not hold a constant", node.kind))
}

/// Constant assigned by an `assign` node (`LIMIT = 10`), if any
pub fn constant_target(node: &AstNode) -> Option<&str> {
    let target = node.node(0)?;
    if target.kind != NodeKind::VarField {
        return None;
    }
    target.node(0).and_then(AstNode::const_name)
}

/// Statements of a body slot.
///
/// Ripper wraps bodies in `bodystmt`; blocks and older dumps use a bare
/// statement list. An endless method (`def x = Foo.new`) has a `bodystmt`
/// holding a single expression, read as a one-statement body.
pub fn body_statements(node: &AstNode, index: usize) -> &[Child] {
    match node.child(index) {
        Some(Child::List(stmts)) => stmts,
        Some(Child::Node(body)) if body.kind == NodeKind::BodyStmt => match body.child(0) {
            Some(Child::List(stmts)) => stmts,
            Some(stmt @ Child::Node(_)) => std::slice::from_ref(stmt),
            _ => &[],
        },
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::decode;
    use serde_json::json;

    fn node(value: serde_json::Value) -> AstNode {
        decode(&value).unwrap().as_node().unwrap().clone()
    }

    #[test]
    fn test_reopened_namespace_merges() {
        let mut first = DefinitionTree::new();
        first.insert_leaf("A");
        let mut second = DefinitionTree::new();
        second.insert_leaf("B");

        let mut tree = DefinitionTree::new();
        tree.insert("Outer", first);
        tree.insert("Outer", second);

        let outer = tree.get("Outer").unwrap();
        assert!(outer.contains("A"));
        assert!(outer.contains("B"));
        assert_eq!(tree.total(), 3);
    }

    #[test]
    fn test_namespace_name() {
        let class = node(json!(["class", ["const_ref", ["@const", "View", [1, 6]]], null,
            ["bodystmt", [["void_stmt"]], null, null, null]]));
        assert_eq!(namespace_name(&class), Ok("View"));

        let scoped = node(json!(["class",
            ["const_path_ref", ["var_ref", ["@const", "A", [1, 6]]], ["@const", "B", [1, 9]]],
            null, ["bodystmt", [["void_stmt"]], null, null, null]]));
        assert!(namespace_name(&scoped).unwrap_err().contains("const_path_ref"));

        let nameless = node(json!(["module"]));
        assert!(namespace_name(&nameless).is_err());
    }

    #[test]
    fn test_constant_target() {
        let constant = node(json!(["assign", ["var_field", ["@const", "LIMIT", [1, 0]]], ["@int", "10", [1, 8]]]));
        assert_eq!(constant_target(&constant), Some("LIMIT"));

        let local = node(json!(["assign", ["var_field", ["@ident", "limit", [1, 0]]], ["@int", "10", [1, 8]]]));
        assert_eq!(constant_target(&local), None);
    }

    #[test]
    fn test_body_statements() {
        let module = node(json!(["module", ["const_ref", ["@const", "M", [1, 7]]],
            ["bodystmt", [["void_stmt"], ["void_stmt"]], null, null, null]]));
        assert_eq!(body_statements(&module, 1).len(), 2);
        assert!(body_statements(&module, 5).is_empty());

        let block = node(json!(["brace_block", null, [["var_ref", ["@const", "X", [1, 2]]]]]));
        assert_eq!(body_statements(&block, 1).len(), 1);
    }

    #[test]
    fn test_endless_method_body_is_one_statement() {
        // def build = Board.new
        let def = node(json!(["def", ["@ident", "build", [1, 4]], null,
            ["bodystmt",
                ["call", ["var_ref", ["@const", "Board", [1, 12]]], ["@period", ".", [1, 17]], ["@ident", "new", [1, 18]]],
                null, null, null]]));

        let stmts = body_statements(&def, 2);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].as_node().unwrap().kind, NodeKind::Call);
    }
}
