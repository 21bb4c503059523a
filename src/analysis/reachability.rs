use tracing::debug;

use super::{Decision, DecisionKind};
use crate::catalog::{Symbol, SymbolKind};
use crate::config::Config;
use crate::search::SearchOutcome;

/// Classifies a symbol as unused or rarely used from a completed search pass.
///
/// Self-references and ignorable matches are already excluded from the
/// outcome by the match filter; this analyzer only interprets counts.
#[derive(Debug, Default)]
pub struct ReachabilityAnalyzer;

impl ReachabilityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(
        &self,
        symbol: &Symbol,
        outcome: &SearchOutcome,
        is_override: bool,
        config: &Config,
    ) -> Option<Decision> {
        // Overriding methods may only be reachable via dynamic dispatch
        // through the base type, so neither verdict is safe.
        if is_override {
            return None;
        }
        // A constructor called even once is doing its job.
        if symbol.modifiers.is_constructor && outcome.count > 0 {
            return None;
        }
        if symbol.kind == SymbolKind::Type && symbol.modifiers.is_main {
            return None;
        }

        let test_only =
            config.detect_test_only && outcome.count > 0 && outcome.count == outcome.test_only_count;
        let count = if test_only { 0 } else { outcome.count };

        if count == 0 {
            debug!("unused: {}", symbol.display());
            let decision = Decision::new(symbol, DecisionKind::Unused, outcome.count);
            if test_only {
                return Some(decision.with_message(format!(
                    "{} '{}' is only referenced by test code",
                    symbol.kind.display_name(),
                    symbol.name
                )));
            }
            return Some(decision);
        }
        if count <= config.warn_limit {
            debug!("rarely used ({}): {}", count, symbol.display());
            return Some(Decision::new(symbol, DecisionKind::RarelyUsed, count));
        }
        None
    }
}
