//! File scanner: definitions and references for one source unit

use super::definitions::{self, DefinitionTree};
use super::references::ScopedReference;
use crate::ast::{AstNode, Child, NodeKind};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::unit::SourceUnit;
use crate::{Error, Result};
use serde::Serialize;

/// Everything the scanner learned about one file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanResult {
    /// Constants the file defines, by lexical nesting
    pub definitions: DefinitionTree,
    /// Constants the file mentions, with their scope paths
    pub references: Vec<ScopedReference>,
    /// Recoverable problems met while scanning
    pub diagnostics: Vec<Diagnostic>,
}

/// Scanner configuration.
///
/// In strict mode the first unrecognized node kind aborts the file's scan
/// with an error; otherwise it is recorded as a diagnostic and skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scanner {
    strict: bool,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Scan a source unit
    pub fn scan(&self, unit: &SourceUnit) -> Result<ScanResult> {
        self.scan_node(&unit.id, &unit.root)
    }

    /// Scan a tree on behalf of the unit named `unit_id`.
    ///
    /// A `program` root is scanned through its statement list; any other
    /// root is treated as a single statement.
    pub fn scan_node(&self, unit_id: &str, root: &AstNode) -> Result<ScanResult> {
        let mut scan = FileScan {
            unit: unit_id,
            strict: self.strict,
            diagnostics: Vec::new(),
        };

        let (definitions, references) = if root.kind == NodeKind::Program {
            scan.scan_statements(root.list(0).unwrap_or(&[]))?
        } else {
            scan.scan_statements(std::slice::from_ref(&Child::Node(root.clone())))?
        };

        tracing::debug!(
            unit = unit_id,
            definitions = definitions.total(),
            references = references.len(),
            "scanned"
        );

        Ok(ScanResult {
            definitions,
            references,
            diagnostics: scan.diagnostics,
        })
    }
}

/// Per-file scanning state: only the diagnostics sink is mutable
pub(super) struct FileScan<'a> {
    unit: &'a str,
    strict: bool,
    diagnostics: Vec<Diagnostic>,
}

impl FileScan<'_> {
    /// Scan one lexical level
    fn scan_statements(&mut self, stmts: &[Child]) -> Result<(DefinitionTree, Vec<ScopedReference>)> {
        let mut tree = DefinitionTree::new();
        let mut references = Vec::new();

        for stmt in stmts {
            if let Some(node) = stmt.as_node() {
                self.scan_statement(node, &mut tree, &mut references)?;
            }
        }

        Ok((tree, references))
    }

    fn scan_statement(
        &mut self,
        node: &AstNode,
        tree: &mut DefinitionTree,
        references: &mut Vec<ScopedReference>,
    ) -> Result<()> {
        match node.kind {
            NodeKind::Class => {
                references.extend(self.expression_references(node)?);
                self.scan_namespace(node, 2, tree, references)
            }
            NodeKind::Module => self.scan_namespace(node, 1, tree, references),
            NodeKind::Assign => {
                if let Some(name) = definitions::constant_target(node) {
                    tree.insert_leaf(name);
                }
                references.extend(self.expression_references(node)?);
                Ok(())
            }
            _ => {
                references.extend(self.expression_references(node)?);
                Ok(())
            }
        }
    }

    /// Register a `class`/`module` and scan its body one level deeper
    fn scan_namespace(
        &mut self,
        node: &AstNode,
        body_index: usize,
        tree: &mut DefinitionTree,
        references: &mut Vec<ScopedReference>,
    ) -> Result<()> {
        let name = match definitions::namespace_name(node) {
            Ok(name) => name,
            Err(reason) => {
                self.report(Diagnostic::new(DiagnosticKind::MalformedDefinition, self.unit, reason).at(node.position()));
                return Ok(());
            }
        };

        let (nested, nested_references) = self.scan_statements(definitions::body_statements(node, body_index))?;
        tree.insert(name, nested);
        references.extend(nested_references.into_iter().map(|r| r.nested_in(name)));
        Ok(())
    }

    /// Handle a node kind the scanner cannot classify
    pub(super) fn unrecognized(&mut self, node: &AstNode) -> Result<()> {
        if self.strict {
            return Err(Error::UnrecognizedNode {
                unit: self.unit.to_string(),
                kind: node.kind.to_string(),
            });
        }

        self.report(
            Diagnostic::new(
                DiagnosticKind::UnrecognizedNode,
                self.unit,
                format!("don't know how to find constants in `{}`", node.kind),
            )
            .at(node.position()),
        );
        Ok(())
    }

    /// Control flow contributes nothing; record it when constants are lost
    /// with it
    pub(super) fn skipped_control_flow(&mut self, node: &AstNode) {
        if !super::references::mentions_constant(node) {
            tracing::trace!(unit = self.unit, kind = %node.kind, "skipped control flow");
            return;
        }

        self.report(
            Diagnostic::new(
                DiagnosticKind::SkippedControlFlow,
                self.unit,
                format!("constants inside `{}` are not tracked", node.kind),
            )
            .at(node.position()),
        );
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::decode;
    use serde_json::{Value, json};

    fn program(stmts: Value) -> AstNode {
        decode(&json!(["program", stmts])).unwrap().as_node().unwrap().clone()
    }

    fn scan(stmts: Value) -> ScanResult {
        Scanner::new().scan_node("test.rb", &program(stmts)).unwrap()
    }

    fn body(stmts: Value) -> Value {
        json!(["bodystmt", stmts, null, null, null])
    }

    fn const_ref(name: &str) -> Value {
        json!(["const_ref", ["@const", name, [1, 6]]])
    }

    fn var_ref(name: &str) -> Value {
        json!(["var_ref", ["@const", name, [2, 2]]])
    }

    fn lexical(name: &str, scope: &[&str]) -> ScopedReference {
        ScopedReference::Lexical {
            name: name.to_string(),
            scope: scope.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_nested_definitions_and_scope_paths() {
        // class Outer; class Inner; Limit; end; end
        let result = scan(json!([
            ["class", const_ref("Outer"), null, body(json!([
                ["class", const_ref("Inner"), null, body(json!([var_ref("Limit")]))]
            ]))]
        ]));

        let outer = result.definitions.get("Outer").unwrap();
        assert!(outer.get("Inner").unwrap().is_empty());
        assert_eq!(result.references, vec![lexical("Limit", &["Outer", "Inner"])]);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_superclass_is_referenced_from_enclosing_scope() {
        // module App; class View < Base; end; end
        let result = scan(json!([
            ["module", const_ref("App"), body(json!([
                ["class", const_ref("View"), var_ref("Base"), body(json!([["void_stmt"]]))]
            ]))]
        ]));

        assert_eq!(result.references, vec![lexical("Base", &["App"])]);
        assert!(result.definitions.get("App").unwrap().contains("View"));
    }

    #[test]
    fn test_constant_assignment_is_a_leaf_and_value_is_scanned() {
        // LIMIT = Defaults::MAX
        let result = scan(json!([
            ["assign", ["var_field", ["@const", "LIMIT", [1, 0]]],
                ["const_path_ref", var_ref("Defaults"), ["@const", "MAX", [1, 18]]]]
        ]));

        assert!(result.definitions.get("LIMIT").unwrap().is_empty());
        assert_eq!(result.references, vec![lexical("Defaults::MAX", &[])]);
    }

    #[test]
    fn test_root_anchored_reference() {
        let result = scan(json!([
            ["module", const_ref("App"), body(json!([["top_const_ref", ["@const", "Config", [2, 4]]]]))]
        ]));

        assert_eq!(result.references, vec![ScopedReference::root("Config")]);
    }

    #[test]
    fn test_method_bodies_calls_and_blocks() {
        // class Game
        //   include Scoring
        //   def start; Board.new(Player, [Rules]); items.each { Item }; end
        // end
        let result = scan(json!([
            ["class", const_ref("Game"), null, body(json!([
                ["command", ["@ident", "include", [2, 2]],
                    ["args_add_block", [var_ref("Scoring")], false]],
                ["def", ["@ident", "start", [3, 6]], ["params", null, null, null, null, null, null, null],
                    body(json!([
                        ["method_add_arg",
                            ["call", var_ref("Board"), ["@period", ".", [4, 9]], ["@ident", "new", [4, 10]]],
                            ["arg_paren", ["args_add_block",
                                [var_ref("Player"), ["array", [var_ref("Rules")]]], false]]],
                        ["method_add_block",
                            ["call", ["vcall", ["@ident", "items", [5, 4]]], ".", ["@ident", "each", [5, 10]]],
                            ["brace_block", null, [var_ref("Item")]]]
                    ]))]
            ]))]
        ]));

        let names: Vec<&str> = result.references.iter().map(ScopedReference::name).collect();
        assert_eq!(names, vec!["Scoring", "Board", "Player", "Rules", "Item"]);
        assert!(result.references.iter().all(|r| r.scope() == ["Game".to_string()]));
        // methods are not definitions
        assert_eq!(result.definitions.get("Game").unwrap().len(), 0);
    }

    #[test]
    fn test_opassign_and_do_block() {
        let result = scan(json!([
            ["opassign", ["var_field", ["@ident", "x", [1, 0]]], ["@op", "||=", [1, 2]], var_ref("Cache")],
            ["method_add_block", ["method_add_arg", ["fcall", ["@ident", "run", [2, 0]]], []],
                ["do_block", null, body(json!([var_ref("Job")]))]]
        ]));

        let names: Vec<&str> = result.references.iter().map(ScopedReference::name).collect();
        assert_eq!(names, vec!["Cache", "Job"]);
    }

    #[test]
    fn test_unknown_kind_is_a_diagnostic() {
        let result = scan(json!([["lambda", ["params"], [var_ref("Hidden")]], var_ref("Seen")]));

        assert_eq!(result.references, vec![lexical("Seen", &[])]);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UnrecognizedNode);
        assert_eq!(result.diagnostics[0].unit, "test.rb");
    }

    #[test]
    fn test_strict_mode_aborts_on_unknown_kind() {
        let root = program(json!([["lambda", ["params"], []]]));
        let err = Scanner::new().strict(true).scan_node("test.rb", &root).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedNode { ref kind, .. } if kind == "lambda"));
    }

    #[test]
    fn test_malformed_definition_is_skipped() {
        // class A::B < Base; Hidden; end
        let result = scan(json!([
            ["class", ["const_path_ref", var_ref("A"), ["@const", "B", [1, 9]]], var_ref("Base"),
                body(json!([var_ref("Hidden")]))],
            ["module", const_ref("Kept"), body(json!([["void_stmt"]]))]
        ]));

        assert!(!result.definitions.contains("B"));
        assert!(result.definitions.contains("Kept"));
        assert_eq!(result.references, vec![lexical("Base", &[])]);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::MalformedDefinition);
    }

    #[test]
    fn test_non_program_root_is_one_statement() {
        let root = decode(&json!(["module", const_ref("Solo"), body(json!([["void_stmt"]]))]))
            .unwrap()
            .as_node()
            .unwrap()
            .clone();
        let result = Scanner::new().scan_node("solo.rb", &root).unwrap();
        assert!(result.definitions.contains("Solo"));
    }

    #[test]
    fn test_control_flow_hiding_constants_is_a_diagnostic() {
        // begin; class Hidden; end; end
        // if ready then Board.new end
        // while running; end
        let result = scan(json!([
            ["begin", body(json!([["class", const_ref("Hidden"), null, body(json!([["void_stmt"]]))]]))],
            ["if", ["var_ref", ["@ident", "ready", [2, 3]]],
                [["call", var_ref("Board"), ["@period", ".", [2, 20]], ["@ident", "new", [2, 21]]]], null],
            ["while", ["var_ref", ["@ident", "running", [3, 6]]], [["void_stmt"]]]
        ]));

        assert!(result.definitions.is_empty());
        assert!(result.references.is_empty());
        let kinds: Vec<DiagnosticKind> = result.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::SkippedControlFlow, DiagnosticKind::SkippedControlFlow]);
        assert!(result.diagnostics[0].message.contains("`begin`"));
    }

    #[test]
    fn test_skipped_control_flow_is_not_fatal_in_strict_mode() {
        let root = program(json!([["unless", var_ref("Flag"), [["void_stmt"]], null]]));
        let result = Scanner::new().strict(true).scan_node("test.rb", &root).unwrap();
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::SkippedControlFlow);
    }

    #[test]
    fn test_endless_method_body_is_scanned() {
        // class Game; def board = Board.new; end
        let result = scan(json!([
            ["class", const_ref("Game"), null, body(json!([
                ["def", ["@ident", "board", [2, 6]], null,
                    ["bodystmt",
                        ["call", var_ref("Board"), ["@period", ".", [2, 19]], ["@ident", "new", [2, 20]]],
                        null, null, null]]
            ]))]
        ]));

        assert_eq!(result.references, vec![lexical("Board", &["Game"])]);
    }
}
