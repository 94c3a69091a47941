//! Reference Resolver - finds the file that owns a referenced constant
//!
//! Resolution algorithm:
//! 1. Build the candidate paths with `search_order`
//! 2. Look each one up in the symbol table
//! 3. The first owner found wins
//! 4. No candidate matches → unresolved (external to the analyzed set)

use super::search::search_order;
use crate::scan::ScopedReference;
use crate::symbol::SymbolTable;

/// Resolver over a finished symbol table
pub struct ReferenceResolver<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self { symbols }
    }

    /// Owning file of a reference, or `None` when it is external
    pub fn resolve(&self, reference: &ScopedReference) -> Option<&'a str> {
        self.resolve_path(reference).map(|(_, owner)| owner)
    }

    /// Matched qualified path together with its owning file
    pub fn resolve_path(&self, reference: &ScopedReference) -> Option<(String, &'a str)> {
        search_order(reference).into_iter().find_map(|path| {
            let owner = self.symbols.owner(&path)?;
            Some((path, owner))
        })
    }
}
