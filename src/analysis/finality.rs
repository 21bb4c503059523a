use tracing::debug;

use crate::catalog::{Symbol, Visibility};
use crate::config::Config;
use crate::search::{
    EnclosingKind, Reference, ReferenceSearchProvider, SearchFailure, SearchKind,
};

/// Decides whether a field or method could carry the `final` keyword.
#[derive(Debug, Default)]
pub struct FinalityAnalyzer;

impl FinalityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// A method is a final candidate unless its own modifiers rule it out,
    /// its declaring type is an interface, or the type has any subclass that
    /// might need to override it.
    pub fn method_can_be_final(
        &self,
        method: &Symbol,
        declaring_type: Option<&Symbol>,
        config: &Config,
    ) -> bool {
        if !config.finality.check_method {
            return false;
        }
        let modifiers = &method.modifiers;
        if method.visibility == Visibility::Private
            || modifiers.is_static
            || modifiers.is_abstract
            || modifiers.is_final
            || modifiers.is_constructor
            || modifiers.is_main
        {
            return false;
        }
        let Some(ty) = declaring_type else {
            return false;
        };
        if ty.modifiers.is_interface || ty.has_subclasses {
            return false;
        }
        true
    }

    /// A field is a final candidate when every write access is an allowed
    /// initialization. The write search stops at the first disqualifying
    /// write.
    pub fn field_can_be_final(
        &self,
        field: &Symbol,
        searcher: &dyn ReferenceSearchProvider,
        config: &Config,
    ) -> Result<bool, SearchFailure> {
        if !config.finality.check_field {
            return Ok(false);
        }
        let modifiers = &field.modifiers;
        if modifiers.is_final || modifiers.is_volatile || modifiers.is_enum_constant {
            return Ok(false);
        }
        let writes = searcher.search(field, SearchKind::WriteAccesses)?;
        for write in writes {
            if disqualifying_write(field, &write) {
                debug!(
                    "write access disqualifies final for {}: {}",
                    field.display(),
                    write.location
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Allowed writes: the field's own declaration initializer, static or
/// instance initializer blocks, and constructors of the declaring type for
/// instance fields. Everything else (setters, other methods, any constructor
/// writing a static field) disqualifies.
fn disqualifying_write(field: &Symbol, write: &Reference) -> bool {
    let Some(enclosing) = &write.enclosing else {
        return false;
    };
    match enclosing.kind {
        EnclosingKind::Field | EnclosingKind::Initializer => false,
        EnclosingKind::Constructor => {
            field.modifiers.is_static
                || enclosing.declaring_type.as_ref() != field.declaring_type.as_ref()
        }
        EnclosingKind::Method | EnclosingKind::Type => true,
    }
}
