//! Dependency linking - turns resolved references into file dependencies

pub mod dependency_linker;
pub mod external;

pub use dependency_linker::{DependencyLinker, LinkStats, Linked};
pub use external::ExternalReferenceLog;
