//! Pre-dumped S-expression producer
//!
//! Reads `.json` files holding `Ripper.sexp(source)` serialized as JSON.

use super::framework::AstProducer;
use crate::ast::{AstNode, parse_program};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct SexpJsonProducer;

impl SexpJsonProducer {
    pub fn new() -> Self {
        Self
    }
}

impl AstProducer for SexpJsonProducer {
    fn name(&self) -> &str {
        "sexp-json"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn produce(&self, path: &str, content: &str) -> Result<AstNode> {
        parse_program(content).map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("{}: {}", path, msg)),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use std::path::Path;

    #[test]
    fn test_produces_program() {
        let producer = SexpJsonProducer::new();
        assert!(producer.can_handle(Path::new("ast/game.json")));
        assert!(!producer.can_handle(Path::new("game.rb")));

        let root = producer
            .produce("game.json", r#"["program", [["var_ref", ["@const", "Board", [1, 0]]]]]"#)
            .unwrap();
        assert_eq!(root.kind, NodeKind::Program);
        assert_eq!(root.list(0).unwrap().len(), 1);
    }

    #[test]
    fn test_syntax_error_names_the_file() {
        let err = SexpJsonProducer::new().produce("broken.json", "null").unwrap_err();
        assert!(matches!(err, Error::Parse(ref msg) if msg.starts_with("broken.json:")));
    }
}
