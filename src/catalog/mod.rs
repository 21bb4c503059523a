//! Symbol catalog: the ordered, duplicate-free input of the analysis.
//!
//! The catalog is built elsewhere (from a project/build model export); this
//! module only holds the loaded records and the grouping that guarantees
//! types are processed before their members.

// Catalog value types - some accessors only used through the library surface
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Stable identity of a symbol: declaring type + kind + name + signature,
/// encoded as a single qualified string (e.g. `com.example.Foo#bar(int)`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of symbol under analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Type,
    Method,
    Field,
}

impl SymbolKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SymbolKind::Type => "type",
            SymbolKind::Method => "method",
            SymbolKind::Field => "field",
        }
    }
}

/// Declared access level. Variants are ordered narrowest to broadest so the
/// derived `Ord` matches the lattice `Public > Protected > Default > Private`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Default,
    Protected,
    #[default]
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Default => "default",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static modifiers of a symbol, as reported by the catalog export.
///
/// `is_main` means the method is a `main` entry point, or for a type that it
/// declares one. `is_interface` is set on interface types and consulted via
/// the declaring type for members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub is_final: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_volatile: bool,
    pub is_constructor: bool,
    pub is_enum_constant: bool,
    pub is_main: bool,
    pub is_serialization_member: bool,
    pub is_interface: bool,
}

/// Location in source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    /// Line number (1-indexed)
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// A type, method or field subject to analysis. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique identifier
    pub id: SymbolId,

    /// Simple name (e.g. `UserStore` or `flush`)
    pub name: String,

    /// Kind of symbol
    pub kind: SymbolKind,

    /// Package the symbol lives in (empty for the default package)
    #[serde(default)]
    pub package: String,

    /// Declaring type, for methods and fields
    #[serde(default)]
    pub declaring_type: Option<SymbolId>,

    /// Declared access level
    #[serde(default)]
    pub visibility: Visibility,

    /// Static modifiers
    #[serde(default)]
    pub modifiers: Modifiers,

    /// Whether any subclass of this type exists (types only)
    #[serde(default)]
    pub has_subclasses: bool,

    /// Whether this is an anonymous type (types only)
    #[serde(default)]
    pub is_anonymous: bool,

    /// Declaration location
    pub location: Location,
}

impl Symbol {
    pub fn new(id: SymbolId, name: impl Into<String>, kind: SymbolKind, location: Location) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            package: String::new(),
            declaring_type: None,
            visibility: Visibility::default(),
            modifiers: Modifiers::default(),
            has_subclasses: false,
            is_anonymous: false,
            location,
        }
    }

    /// Qualified name used for literal search (`package.Name`, or the simple
    /// name in the default package).
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    /// The type this symbol belongs to: the declaring type for members, the
    /// symbol itself for types.
    pub fn owning_type(&self) -> &SymbolId {
        self.declaring_type.as_ref().unwrap_or(&self.id)
    }

    /// `java.lang.Object` boilerplate that every class carries and that is
    /// reachable through the runtime regardless of references.
    pub fn is_object_boilerplate(&self) -> bool {
        self.kind == SymbolKind::Method
            && matches!(
                self.name.as_str(),
                "toString" | "hashCode" | "equals" | "clone" | "finalize"
            )
    }

    pub fn display(&self) -> String {
        format!(
            "{} {} ({})",
            self.kind.display_name(),
            self.name,
            self.location
        )
    }
}

/// One type together with its members, in catalog order.
///
/// `declaration` may be absent when the export lists members whose type is
/// outside the analyzed scope.
#[derive(Debug, Clone, Default)]
pub struct TypeRecord {
    pub declaration: Option<Symbol>,
    pub methods: Vec<Symbol>,
    pub fields: Vec<Symbol>,
}

impl TypeRecord {
    pub fn symbol_count(&self) -> usize {
        self.declaration.iter().len() + self.methods.len() + self.fields.len()
    }
}

/// The ordered, duplicate-free collection of candidate symbols, grouped by
/// declaring type so that every type precedes its members.
#[derive(Debug, Default)]
pub struct SymbolCatalog {
    records: Vec<TypeRecord>,
    by_id: HashMap<SymbolId, Symbol>,
}

impl SymbolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a flat, ordered symbol list into type records. Members are
    /// attached to their declaring type's record; members whose declaring
    /// type never appears get a record without a type declaration.
    pub fn from_symbols(symbols: Vec<Symbol>) -> Self {
        let mut catalog = Self::new();
        let mut record_index: HashMap<SymbolId, usize> = HashMap::new();

        for symbol in symbols {
            if catalog.by_id.contains_key(&symbol.id) {
                continue;
            }
            catalog.by_id.insert(symbol.id.clone(), symbol.clone());

            let owner = symbol.owning_type().clone();
            let index = *record_index.entry(owner).or_insert_with(|| {
                catalog.records.push(TypeRecord::default());
                catalog.records.len() - 1
            });
            let record = &mut catalog.records[index];
            match symbol.kind {
                SymbolKind::Type => record.declaration = Some(symbol),
                SymbolKind::Method => record.methods.push(symbol),
                SymbolKind::Field => record.fields.push(symbol),
            }
        }

        catalog
    }

    pub fn get(&self, id: &SymbolId) -> Option<&Symbol> {
        self.by_id.get(id)
    }

    pub fn records(&self) -> &[TypeRecord] {
        &self.records
    }

    pub fn type_count(&self) -> usize {
        self.records.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.records.iter().map(TypeRecord::symbol_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
