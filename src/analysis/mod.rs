// Decision model - some accessors only used through the library surface
#![allow(dead_code)]

mod finality;
mod orchestrator;
mod reachability;
mod visibility;

pub use finality::FinalityAnalyzer;
pub use orchestrator::{AnalysisOrchestrator, Providers};
pub use reachability::ReachabilityAnalyzer;
pub use visibility::VisibilityAnalyzer;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::catalog::{Symbol, SymbolId, Visibility};
use crate::search::SearchFailure;

/// A detected refactoring opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// The symbol the decision is about
    pub symbol_id: SymbolId,

    /// The kind of opportunity
    pub kind: DecisionKind,

    /// Declaration line of the symbol
    pub line: u32,

    /// Human-readable description
    pub message: String,

    /// Accepted references backing the decision
    pub reference_count: usize,
}

impl Decision {
    pub fn new(symbol: &Symbol, kind: DecisionKind, reference_count: usize) -> Self {
        let message = kind.default_message(symbol, reference_count);
        Self {
            symbol_id: symbol.id.clone(),
            kind,
            line: symbol.location.line,
            message,
            reference_count,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = message;
        self
    }

    /// Identity for deduplication: one decision per (symbol, kind) per run.
    /// The target level of a visibility reduction is not part of the
    /// identity.
    pub fn identity(&self) -> (SymbolId, &'static str) {
        (self.symbol_id.clone(), self.kind.tag())
    }
}

/// Types of refactoring opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionKind {
    /// Symbol has no accepted references
    Unused,

    /// Symbol has fewer references than the warn limit
    RarelyUsed,

    /// Field is written but never read
    NeverRead,

    /// Field or method could be declared final
    CanBeFinal,

    /// A narrower access level is sufficient
    ReduceVisibility { to: Visibility },
}

impl DecisionKind {
    pub fn tag(&self) -> &'static str {
        match self {
            DecisionKind::Unused => "unused",
            DecisionKind::RarelyUsed => "rarely-used",
            DecisionKind::NeverRead => "never-read",
            DecisionKind::CanBeFinal => "can-be-final",
            DecisionKind::ReduceVisibility { .. } => "reduce-visibility",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DecisionKind::Unused => "RF001",
            DecisionKind::RarelyUsed => "RF002",
            DecisionKind::NeverRead => "RF003",
            DecisionKind::CanBeFinal => "RF004",
            DecisionKind::ReduceVisibility { .. } => "RF005",
        }
    }

    pub fn default_message(&self, symbol: &Symbol, reference_count: usize) -> String {
        match self {
            DecisionKind::Unused => {
                format!(
                    "{} '{}' is never used",
                    symbol.kind.display_name(),
                    symbol.name
                )
            }
            DecisionKind::RarelyUsed => {
                format!(
                    "{} '{}' has only {} reference{}",
                    symbol.kind.display_name(),
                    symbol.name,
                    reference_count,
                    if reference_count == 1 { "" } else { "s" }
                )
            }
            DecisionKind::NeverRead => {
                format!("field '{}' is assigned but never read", symbol.name)
            }
            DecisionKind::CanBeFinal => {
                format!(
                    "{} '{}' could be declared final",
                    symbol.kind.display_name(),
                    symbol.name
                )
            }
            DecisionKind::ReduceVisibility { to } => {
                format!(
                    "{} '{}' could be {}",
                    symbol.kind.display_name(),
                    symbol.name,
                    to.as_str()
                )
            }
        }
    }
}

/// Why a run ended before the catalog was exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// External cancellation signal
    Cancelled,

    /// More search failures than the configured threshold
    TooManyFailures,

    /// Unrecoverable resource exhaustion reported by a search capability
    ResourceExhausted,
}

impl AbortReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbortReason::Cancelled => "cancelled",
            AbortReason::TooManyFailures => "too many search failures",
            AbortReason::ResourceExhausted => "resource exhausted",
        }
    }
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// End-of-run accounting. Produced exactly once, aborted or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub decisions_emitted: usize,
    pub symbols_searched: usize,
    pub duration: Duration,
    pub problems: Vec<SearchFailure>,
    pub aborted: Option<AbortReason>,
}

impl RunSummary {
    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }
}
