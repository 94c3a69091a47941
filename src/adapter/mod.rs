//! AST Producer Framework
//!
//! Turning source text into the nested-node AST is outside the analysis
//! itself. Each producer owns one way of getting there (a pre-dumped
//! S-expression, or a Ruby interpreter's Ripper run as a subprocess) and
//! the analysis never sees which one was used.

pub mod framework;
pub mod sexp_json;
pub mod ripper;

pub use framework::{AstProducer, ProducerRegistry, default_registry};
pub use ripper::RipperProducer;
pub use sexp_json::SexpJsonProducer;
