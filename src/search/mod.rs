//! Search boundary: the capabilities the engine consumes.
//!
//! The actual reference search and text search mechanisms live outside this
//! crate; the engine only requires lazy, pull-based enumeration that can be
//! stopped early by dropping the iterator.

// Boundary types - some constructors only used through the library surface
#![allow(dead_code)]

pub mod filter;
mod literal;
mod reference;

pub use literal::{is_identifier_part, is_identifier_start, LiteralMatch};
pub use reference::{EnclosingElement, EnclosingKind, MatchAccuracy, Reference, ReferenceKind};

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{Symbol, SymbolId};

/// What a reference search should enumerate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    References,
    ReadAccesses,
    WriteAccesses,
}

impl SearchKind {
    /// Whether a reference of `kind` belongs to this search.
    pub fn matches(&self, kind: ReferenceKind) -> bool {
        match self {
            SearchKind::References => true,
            SearchKind::ReadAccesses => kind.is_read(),
            SearchKind::WriteAccesses => kind.is_write(),
        }
    }
}

/// Aggregate of one search pass over a symbol.
///
/// `test_only_count` never exceeds `count`, and `count` never decreases once
/// recorded within a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Accepted matches (code references plus accepted literal matches)
    pub count: usize,

    /// Accepted matches located in test code
    pub test_only_count: usize,

    /// Whether enumeration was stopped before exhausting the provider
    pub cancelled_early: bool,
}

/// Classification of a failed search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The search mechanism itself failed (unresolved binding, internal error)
    Search,
    /// An I/O error while reading a file
    Io,
    /// The search ran out of memory or another unrecoverable resource
    ResourceExhausted,
}

/// A recoverable-per-symbol problem raised by a search capability.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("problems searching {}: {message}", symbol.as_ref().map(SymbolId::as_str).unwrap_or("<no symbol>"))]
pub struct SearchFailure {
    pub symbol: Option<SymbolId>,
    pub kind: FailureKind,
    pub message: String,
}

impl SearchFailure {
    pub fn new(symbol: Option<SymbolId>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            symbol,
            kind,
            message: message.into(),
        }
    }

    pub fn search(symbol: &Symbol, message: impl Into<String>) -> Self {
        Self::new(Some(symbol.id.clone()), FailureKind::Search, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(None, FailureKind::Io, message)
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == FailureKind::ResourceExhausted
    }
}

pub type ReferenceStream<'a> = Box<dyn Iterator<Item = Reference> + 'a>;
pub type LiteralStream<'a> = Box<dyn Iterator<Item = LiteralMatch> + 'a>;

/// Code-aware reference search. Each call is restartable and idempotent; the
/// returned stream is lazy and may be abandoned at any point.
pub trait ReferenceSearchProvider {
    fn search(&self, symbol: &Symbol, kind: SearchKind)
        -> Result<ReferenceStream<'_>, SearchFailure>;
}

/// Plain-text occurrence search over a file-pattern scope.
pub trait LiteralSearchProvider {
    fn search_literal(
        &self,
        token: &str,
        file_patterns: &[String],
    ) -> Result<LiteralStream<'_>, SearchFailure>;
}

/// Type-hierarchy queries backing the override and subclass safety rules.
pub trait HierarchyProvider {
    /// Whether any subtype overrides this method. Expensive; the engine calls
    /// it at most once per method symbol.
    fn is_overridden(&self, method: &Symbol) -> Result<bool, SearchFailure>;

    fn is_subtype_of(&self, ty: &SymbolId, ancestor: &SymbolId) -> bool;
}

/// Cooperative whole-run cancellation signal, checked between symbols and
/// while enumerating matches.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
