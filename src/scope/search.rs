//! Candidate paths for a reference, in the order they are tried

use crate::scan::ScopedReference;
use crate::symbol::qualify;

/// Qualified paths to try for `reference`, first match wins.
///
/// Root-anchored references only ever try `::Name`. Lexical references
/// start from the top-level form and then widen the prefix with the
/// enclosing namespaces, outermost first: for `Limit` inside
/// `Outer::Inner` the order is `::Limit`, `::Outer::Limit`,
/// `::Outer::Inner::Limit`.
///
/// Note this is outward-in, not the innermost-first order Ruby itself
/// uses for lexical constant lookup: a top-level `Limit` shadows
/// `Outer::Limit` here.
pub fn search_order(reference: &ScopedReference) -> Vec<String> {
    let name = reference.name();
    let scope = reference.scope();

    let mut candidates = Vec::with_capacity(scope.len() + 1);
    let mut prefix = String::new();
    candidates.push(qualify(&prefix, name));

    for namespace in scope {
        prefix = qualify(&prefix, namespace);
        candidates.push(qualify(&prefix, name));
    }

    candidates
}
