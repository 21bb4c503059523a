use regex::Regex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::search::{
    FailureKind, LiteralMatch, LiteralSearchProvider, LiteralStream, SearchFailure,
};

/// Plain-text token search over a project tree, honoring ignore files.
///
/// Matching files are read one at a time while the consumer pulls, so an
/// abandoned stream costs only the files scanned so far.
#[derive(Debug, Clone)]
pub struct FileLiteralSearch {
    root: PathBuf,
}

impl FileLiteralSearch {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LiteralSearchProvider for FileLiteralSearch {
    fn search_literal(
        &self,
        token: &str,
        file_patterns: &[String],
    ) -> Result<LiteralStream<'_>, SearchFailure> {
        let regex = Regex::new(&regex::escape(token)).map_err(|error| {
            SearchFailure::new(None, FailureKind::Search, format!("bad literal token: {error}"))
        })?;
        Ok(Box::new(LiteralMatches {
            walker: ignore::WalkBuilder::new(&self.root).build(),
            regex,
            patterns: file_patterns.to_vec(),
            pending: VecDeque::new(),
        }))
    }
}

struct LiteralMatches {
    walker: ignore::Walk,
    regex: Regex,
    patterns: Vec<String>,
    pending: VecDeque<LiteralMatch>,
}

impl Iterator for LiteralMatches {
    type Item = LiteralMatch;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(found) = self.pending.pop_front() {
                return Some(found);
            }
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(_) => continue,
            };
            if !entry.file_type().is_some_and(|file_type| file_type.is_file()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !self.patterns.iter().any(|pattern| glob_match(pattern, &name)) {
                continue;
            }
            // Unreadable or binary files are silently skipped; the fallback
            // signal only cares about text.
            let Ok(contents) = std::fs::read_to_string(entry.path()) else {
                continue;
            };
            self.scan_file(entry.path(), &contents);
        }
    }
}

impl LiteralMatches {
    fn scan_file(&mut self, path: &Path, contents: &str) {
        for found in self.regex.find_iter(contents) {
            let offset = found.start();
            let line = contents[..offset].matches('\n').count() as u32 + 1;
            self.pending.push_back(LiteralMatch {
                file: path.to_path_buf(),
                offset,
                line,
                enclosing_container: None,
                char_before: contents[..offset].chars().next_back(),
                char_after: contents[found.end()..].chars().next(),
            });
        }
    }
}

/// Star-glob matching for file name patterns like `*.xml` or `log4j*`.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix('*') {
        return name.ends_with(suffix);
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return name.starts_with(prefix);
    }
    name == pattern
}
