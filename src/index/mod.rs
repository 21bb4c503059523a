//! Snapshot-backed search providers.
//!
//! The real reference search lives in the tool that exports the snapshot;
//! this module replays an exported symbol/reference model behind the same
//! provider traits the engine consumes.

// Index accessors - some counters only used through the library surface
#![allow(dead_code)]

mod literal;

pub use literal::FileLiteralSearch;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::catalog::{Symbol, SymbolCatalog, SymbolId};
use crate::search::{
    HierarchyProvider, Reference, ReferenceSearchProvider, ReferenceStream, SearchFailure,
    SearchKind,
};

/// Errors loading a snapshot file
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An exported symbol/reference model: the symbols to analyze, every
/// reference between them, and the hierarchy facts the safety rules need.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub symbols: Vec<Symbol>,

    #[serde(default)]
    pub references: Vec<Reference>,

    /// Methods overridden by at least one subtype
    #[serde(default)]
    pub overridden_methods: Vec<SymbolId>,

    /// Direct supertypes per type
    #[serde(default)]
    pub supertypes: HashMap<SymbolId, Vec<SymbolId>>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn to_catalog(&self) -> SymbolCatalog {
        SymbolCatalog::from_symbols(self.symbols.clone())
    }
}

/// Incoming-reference index over a snapshot. Nodes are symbol ids, edges are
/// the references pointing at them; searches enumerate incoming edges lazily.
#[derive(Debug)]
pub struct ReferenceIndex {
    inner: DiGraph<SymbolId, Reference>,
    node_map: HashMap<SymbolId, NodeIndex>,
    overridden: HashSet<SymbolId>,
    supertypes: HashMap<SymbolId, Vec<SymbolId>>,
}

impl ReferenceIndex {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut index = Self {
            inner: DiGraph::new(),
            node_map: HashMap::new(),
            overridden: snapshot.overridden_methods.iter().cloned().collect(),
            supertypes: snapshot.supertypes.clone(),
        };

        for symbol in &snapshot.symbols {
            index.node(&symbol.id);
        }
        for reference in &snapshot.references {
            // Unresolved matches still travel through the index so the
            // acceptance filter can see (and discard) them.
            let source = reference
                .enclosing
                .as_ref()
                .map(|enclosing| enclosing.id.clone())
                .unwrap_or_else(|| SymbolId::new("<unresolved>"));
            let from = index.node(&source);
            let to = index.node(&reference.target);
            index.inner.add_edge(from, to, reference.clone());
        }

        index
    }

    fn node(&mut self, id: &SymbolId) -> NodeIndex {
        if let Some(&existing) = self.node_map.get(id) {
            return existing;
        }
        let added = self.inner.add_node(id.clone());
        self.node_map.insert(id.clone(), added);
        added
    }

    pub fn reference_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn symbol_count(&self) -> usize {
        self.node_map.len()
    }
}

impl ReferenceSearchProvider for ReferenceIndex {
    fn search(
        &self,
        symbol: &Symbol,
        kind: SearchKind,
    ) -> Result<ReferenceStream<'_>, SearchFailure> {
        let Some(&node) = self.node_map.get(&symbol.id) else {
            return Ok(Box::new(std::iter::empty()));
        };
        Ok(Box::new(
            self.inner
                .edges_directed(node, petgraph::Direction::Incoming)
                .map(|edge| edge.weight().clone())
                .filter(move |reference| kind.matches(reference.kind)),
        ))
    }
}

impl HierarchyProvider for ReferenceIndex {
    fn is_overridden(&self, method: &Symbol) -> Result<bool, SearchFailure> {
        Ok(self.overridden.contains(&method.id))
    }

    fn is_subtype_of(&self, ty: &SymbolId, ancestor: &SymbolId) -> bool {
        if ty == ancestor {
            return false;
        }
        let mut stack = vec![ty];
        let mut seen: HashSet<&SymbolId> = HashSet::new();
        while let Some(current) = stack.pop() {
            let Some(parents) = self.supertypes.get(current) else {
                continue;
            };
            for parent in parents {
                if parent == ancestor {
                    return true;
                }
                if seen.insert(parent) {
                    stack.push(parent);
                }
            }
        }
        false
    }
}
