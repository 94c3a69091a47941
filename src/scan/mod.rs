//! AST Scanner - finds constant definitions and references in one file
//!
//! The scanner walks a file's statements level by level:
//! - `class`/`module` bodies become nested definition trees, and every
//!   reference found inside them gets the enclosing name prepended to its
//!   scope path
//! - constant assignments become leaf definitions
//! - expressions contribute the constants they mention, at the current level
//!
//! Scanning is a pure function of one file's tree, so files can be scanned
//! on any number of threads.

pub mod definitions;
pub mod references;
pub mod scanner;

pub use definitions::DefinitionTree;
pub use references::ScopedReference;
pub use scanner::{ScanResult, Scanner};
