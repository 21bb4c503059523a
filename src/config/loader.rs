use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::catalog::{SymbolKind, Visibility};

pub const DEFAULT_WARN_LIMIT: usize = 2;
pub const DEFAULT_FAILURE_ABORT_THRESHOLD: usize = 100;

/// Configuration for a refaudit run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reference counts up to this limit are reported as "rarely used"
    #[serde(deserialize_with = "lenient_warn_limit")]
    pub warn_limit: usize,

    /// Treat symbols referenced only from test code as unused
    pub detect_test_only: bool,

    /// Abort the whole run after this many search failures
    #[serde(deserialize_with = "lenient_failure_threshold")]
    pub failure_abort_threshold: usize,

    /// Literal (plain-text) fallback search for type names
    pub literal: LiteralSearchConfig,

    /// Final-candidate detection
    pub finality: FinalityConfig,

    /// Visibility-reduction detection
    pub visibility: VisibilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteralSearchConfig {
    /// Search type names as plain text in non-code files
    pub enabled: bool,

    /// Search the fully qualified name instead of the simple name
    pub fully_qualified: bool,

    /// File patterns to search, like `*.xml`
    pub file_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalityConfig {
    /// Report methods that could be final
    pub check_method: bool,

    /// Report fields that could be final
    pub check_field: bool,
}

/// Target levels a symbol kind may be narrowed to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityTargets {
    pub to_protected: bool,
    pub to_default: bool,
    pub to_private: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    pub types: VisibilityTargets,
    pub methods: VisibilityTargets,
    pub fields: VisibilityTargets,
}

impl VisibilityConfig {
    fn targets(&self, kind: SymbolKind) -> &VisibilityTargets {
        match kind {
            SymbolKind::Type => &self.types,
            SymbolKind::Method => &self.methods,
            SymbolKind::Field => &self.fields,
        }
    }

    /// Whether a reduction of `kind` down to `to` should be reported.
    pub fn enabled_for(&self, kind: SymbolKind, to: Visibility) -> bool {
        let targets = self.targets(kind);
        match to {
            Visibility::Protected => targets.to_protected,
            Visibility::Default => targets.to_default,
            Visibility::Private => targets.to_private,
            Visibility::Public => false,
        }
    }

    /// Whether any reduction is enabled for `kind`. Used to decide when
    /// counting references past the warn limit is pointless.
    pub fn any_enabled_for(&self, kind: SymbolKind) -> bool {
        let targets = self.targets(kind);
        targets.to_protected || targets.to_default || targets.to_private
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            warn_limit: DEFAULT_WARN_LIMIT,
            detect_test_only: false,
            failure_abort_threshold: DEFAULT_FAILURE_ABORT_THRESHOLD,
            literal: LiteralSearchConfig::default(),
            finality: FinalityConfig::default(),
            visibility: VisibilityConfig::default(),
        }
    }
}

impl Default for LiteralSearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fully_qualified: false,
            file_patterns: vec!["*.xml".to_string()],
        }
    }
}

impl Default for FinalityConfig {
    fn default() -> Self {
        Self {
            check_method: true,
            check_field: true,
        }
    }
}

impl Default for VisibilityTargets {
    fn default() -> Self {
        Self {
            to_protected: true,
            to_default: true,
            to_private: true,
        }
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            types: VisibilityTargets::default(),
            methods: VisibilityTargets::default(),
            fields: VisibilityTargets::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".refaudit.yml",
            ".refaudit.yaml",
            ".refaudit.toml",
            "refaudit.yml",
            "refaudit.yaml",
            "refaudit.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }
}

fn lenient_warn_limit<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_count(deserializer, DEFAULT_WARN_LIMIT))
}

fn lenient_failure_threshold<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_count(deserializer, DEFAULT_FAILURE_ABORT_THRESHOLD))
}

/// Numeric options never fail the load: anything that is not a non-negative
/// integer falls back to the documented default.
fn lenient_count<'de, D>(deserializer: D, fallback: usize) -> usize
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Other(serde::de::IgnoredAny),
    }

    match Raw::deserialize(deserializer) {
        Ok(Raw::Int(value)) if value >= 0 => value as usize,
        _ => fallback,
    }
}
