//! Configuration loader and validator.
//!
//! Responsibilities:
//! - Read a YAML/JSON config file (path from `ELEMENTS_CONFIG` or explicit)
//! - Apply defaults for missing fields
//! - Validate constraints (non-empty runtime names, positive indent width)

pub mod model;

use crate::config::model::CompilerConfig;
use crate::errors::Result;
use std::path::Path;
use tracing::debug;

/// Environment variable holding an optional config file path.
pub const CONFIG_ENV: &str = "ELEMENTS_CONFIG";

/// Parse a config document. YAML is a superset of JSON, so both are accepted.
pub fn from_yaml_str(text: &str) -> Result<CompilerConfig> {
    let cfg: CompilerConfig = serde_yml::from_str(text)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &Path) -> Result<CompilerConfig> {
    let text = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), "loading compiler config");
    from_yaml_str(&text)
}

/// Load from the file named by `ELEMENTS_CONFIG`, falling back to defaults.
pub fn load_from_env_or_default() -> Result<CompilerConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.trim().is_empty() => load_from_file(Path::new(path.trim())),
        _ => {
            let cfg = CompilerConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}
