//! Core producer framework
//!
//! Defines the trait every AST producer implements and the registry that
//! picks one per file.

use crate::ast::AstNode;
use crate::unit::SourceUnit;
use crate::Result;
use std::path::Path;

/// Trait for AST producers
///
/// A producer is responsible for:
/// 1. Identifying files it can read
/// 2. Turning their content into a `program` node
pub trait AstProducer: Send + Sync {
    /// Producer name (for display)
    fn name(&self) -> &str;

    /// File extensions this producer handles
    fn file_extensions(&self) -> &[&str];

    /// Check if this producer can handle a file
    fn can_handle(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            self.file_extensions().contains(&ext)
        } else {
            false
        }
    }

    /// Produce the AST of one file
    fn produce(&self, path: &str, content: &str) -> Result<AstNode>;
}

/// Registry of AST producers; the first one that can handle a file wins
#[derive(Default)]
pub struct ProducerRegistry {
    producers: Vec<Box<dyn AstProducer>>,
}

impl ProducerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, producer: impl AstProducer + 'static) {
        self.producers.push(Box::new(producer));
    }

    /// Find a producer for a file
    pub fn find_producer(&self, path: &Path) -> Option<&dyn AstProducer> {
        self.producers
            .iter()
            .find(|p| p.can_handle(path))
            .map(|p| p.as_ref())
    }

    pub fn producers(&self) -> &[Box<dyn AstProducer>] {
        &self.producers
    }

    /// Every extension some producer handles
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self
            .producers
            .iter()
            .flat_map(|p| p.file_extensions().iter().copied())
            .collect();
        extensions.sort_unstable();
        extensions.dedup();
        extensions
    }

    /// Produce a source unit for `id`, or `None` when no producer handles it
    pub fn produce(&self, id: &str, path: &Path, content: &str) -> Result<Option<SourceUnit>> {
        if let Some(producer) = self.find_producer(path) {
            tracing::trace!(unit = id, producer = producer.name(), "producing AST");
            let root = producer.produce(id, content)?;
            Ok(Some(SourceUnit::new(id, root)))
        } else {
            Ok(None)
        }
    }
}

/// Create a registry with the built-in producers.
///
/// `ruby` is the interpreter used for `.rb` sources; `None` leaves Ruby
/// sources unhandled so only pre-dumped `.json` ASTs are read.
pub fn default_registry(ruby: Option<&str>) -> ProducerRegistry {
    let mut registry = ProducerRegistry::new();
    registry.register(super::sexp_json::SexpJsonProducer::new());
    if let Some(ruby) = ruby {
        registry.register(super::ripper::RipperProducer::new(ruby));
    }
    registry
}
