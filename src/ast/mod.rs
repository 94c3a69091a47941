//! AST model - the tree shape the scanner reads
//!
//! Producers hand the core a tree of tagged nodes modelled after Ruby's
//! Ripper S-expressions: every node has a kind tag and an ordered list of
//! children, each child being a nested node, a list, a literal, a source
//! position, a flag or nil.

pub mod node;
pub mod sexp;

pub use node::{AstNode, Child, NodeKind, Position};
pub use sexp::{decode, parse_program};
