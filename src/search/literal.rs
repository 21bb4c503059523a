use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog::SymbolId;

/// A textual, non-code-aware occurrence of a symbol's name, used as a
/// fallback signal for reflection and configuration-file references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralMatch {
    pub file: PathBuf,

    /// Byte offset of the occurrence in the file
    pub offset: usize,

    /// Line number (1-indexed)
    pub line: u32,

    /// Catalog symbol the occurrence lies in, when the file maps to one
    #[serde(default)]
    pub enclosing_container: Option<SymbolId>,

    /// Character before the occurrence; `None` at the start of the file
    pub char_before: Option<char>,

    /// Character after the occurrence; `None` at the end of the file
    pub char_after: Option<char>,
}

impl LiteralMatch {
    /// A match counts only when it is a whole token: neither neighbour may be
    /// a Java identifier character (`Foo` must not match inside `FooBar`).
    pub fn is_word_match(&self) -> bool {
        let before_ok = !self.char_before.is_some_and(is_identifier_start);
        let after_ok = !self.char_after.is_some_and(is_identifier_part);
        before_ok && after_ok
    }
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
