use tracing::debug;

use super::{Decision, DecisionKind};
use crate::catalog::{Symbol, Visibility};
use crate::config::Config;
use crate::search::{HierarchyProvider, Reference};

/// Computes the minimal sufficient access level of a symbol from the
/// locations of its accepted references.
#[derive(Debug, Default)]
pub struct VisibilityAnalyzer;

impl VisibilityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// The access level a single reference demands of `symbol`: same type
    /// needs nothing, same package needs `default`, a subclass in another
    /// package needs `protected`, anything else needs `public`.
    pub fn required_for(
        &self,
        symbol: &Symbol,
        reference: &Reference,
        hierarchy: &dyn HierarchyProvider,
    ) -> Visibility {
        let Some(enclosing) = &reference.enclosing else {
            return Visibility::Public;
        };
        let owning_type = symbol.owning_type();
        let enclosing_type = enclosing.enclosing_type_id();
        if enclosing_type == owning_type {
            return Visibility::Private;
        }
        if enclosing.package == symbol.package {
            return Visibility::Default;
        }
        if hierarchy.is_subtype_of(enclosing_type, owning_type) {
            return Visibility::Protected;
        }
        Visibility::Public
    }

    /// Suggest a narrower access level, if the references allow one and the
    /// configuration asks for it. `floor` carries requirements established
    /// outside the reference list (literal matches); references from the
    /// symbol's own type never raise the requirement.
    pub fn suggest(
        &self,
        symbol: &Symbol,
        references: &[Reference],
        floor: Visibility,
        hierarchy: &dyn HierarchyProvider,
        config: &Config,
    ) -> Option<Decision> {
        let required = references
            .iter()
            .map(|reference| self.required_for(symbol, reference, hierarchy))
            .fold(floor, |acc, level| acc.max(level));

        if symbol.visibility <= required {
            return None;
        }
        if !config.visibility.enabled_for(symbol.kind, required) {
            return None;
        }
        debug!(
            "visibility of {} can shrink from {} to {}",
            symbol.display(),
            symbol.visibility,
            required
        );
        Some(Decision::new(
            symbol,
            DecisionKind::ReduceVisibility { to: required },
            references.len(),
        ))
    }
}
