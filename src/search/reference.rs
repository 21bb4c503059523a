// Reference types - some predicates only used through the library surface
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use crate::catalog::{Location, SymbolId};

/// Kind of reference to a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// Calling a method
    Call,

    /// Reading a field
    Read,

    /// Writing to a field
    Write,

    /// Type reference (declaration, cast, generic argument, ...)
    TypeUse,

    /// Instantiation (constructor call)
    Instantiation,

    /// Inheritance (extends/implements)
    Inheritance,

    /// Import statement
    Import { is_static: bool },
}

impl ReferenceKind {
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            ReferenceKind::Read | ReferenceKind::Call | ReferenceKind::TypeUse
        )
    }

    pub fn is_write(&self) -> bool {
        matches!(self, ReferenceKind::Write)
    }

    pub fn is_import(&self) -> bool {
        matches!(self, ReferenceKind::Import { .. })
    }
}

/// Accuracy of a match as reported by the search mechanism. Inaccurate
/// matches come from compile errors or ambiguous bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchAccuracy {
    #[default]
    Exact,
    Inaccurate,
}

/// Kind of the element a match was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnclosingKind {
    Type,
    Method,
    Constructor,
    Field,
    /// Static or instance initializer block
    Initializer,
}

/// The resolved element a match was found in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclosingElement {
    pub id: SymbolId,
    pub kind: EnclosingKind,
    /// Declaring type of the enclosing element; absent when the element is a
    /// type itself
    #[serde(default)]
    pub declaring_type: Option<SymbolId>,
    #[serde(default)]
    pub package: String,
}

impl EnclosingElement {
    /// The type a match effectively lives in.
    pub fn enclosing_type_id(&self) -> &SymbolId {
        self.declaring_type.as_ref().unwrap_or(&self.id)
    }
}

/// A located use of a symbol, produced transiently per search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// The symbol being referenced
    pub target: SymbolId,

    /// Where the reference occurs
    pub location: Location,

    /// The element the reference occurs in; `None` when the match could not
    /// be resolved to a symbol-bearing element
    #[serde(default)]
    pub enclosing: Option<EnclosingElement>,

    /// Kind of reference
    pub kind: ReferenceKind,

    #[serde(default)]
    pub accuracy: MatchAccuracy,

    /// Whether the match lies inside a documentation comment
    #[serde(default)]
    pub in_doc_comment: bool,

    /// Whether the referencing code is test code
    #[serde(default)]
    pub is_test_code: bool,
}

impl Reference {
    pub fn new(target: SymbolId, location: Location, kind: ReferenceKind) -> Self {
        Self {
            target,
            location,
            enclosing: None,
            kind,
            accuracy: MatchAccuracy::Exact,
            in_doc_comment: false,
            is_test_code: false,
        }
    }

    pub fn with_enclosing(mut self, enclosing: EnclosingElement) -> Self {
        self.enclosing = Some(enclosing);
        self
    }
}
