//! Reference resolution - maps a scoped reference back to its defining file
//!
//! Resolution tries qualified paths built from the reference's scope path
//! (see `search::search_order`) against the symbol table, first hit wins.

pub mod resolver;
pub mod search;

pub use resolver::ReferenceResolver;
pub use search::search_order;
