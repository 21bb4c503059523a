//! Match acceptance, shared by the reachability and visibility passes.
//!
//! A raw search match is discarded, never counted, when it lies inside a
//! documentation comment, when its accuracy is inaccurate (compile error or
//! ambiguous binding), when it does not resolve to a symbol-bearing element,
//! or when an import declaration is not a static import. Type symbols
//! additionally never count references from inside themselves.

use crate::catalog::{Symbol, SymbolKind};
use crate::search::{MatchAccuracy, Reference, ReferenceKind};

/// Whether a raw match counts as a use of `symbol`.
pub fn accept(symbol: &Symbol, reference: &Reference) -> bool {
    if reference.in_doc_comment {
        return false;
    }
    if reference.accuracy == MatchAccuracy::Inaccurate {
        return false;
    }
    let Some(enclosing) = &reference.enclosing else {
        return false;
    };
    // An import alone may be an unnecessary import and proves nothing,
    // unless it is a static import.
    if let ReferenceKind::Import { is_static } = reference.kind {
        if !is_static {
            return false;
        }
    }
    if symbol.kind == SymbolKind::Type && enclosing.enclosing_type_id() == &symbol.id {
        return false;
    }
    true
}
