mod loader;

pub use loader::{Config, FinalityConfig, LiteralSearchConfig, VisibilityConfig, VisibilityTargets};
