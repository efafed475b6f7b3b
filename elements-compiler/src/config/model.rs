//! Configuration data structures for the compiler pipeline.
//!
//! Groups:
//! - [`CompilerConfig`]: top-level container for all config groups
//! - [`ScopeConfig`]: names that always resolve as declared
//! - [`CodegenConfig`]: runtime names and sentinels used in generated code
//! - [`ModuleConfig`]: file extensions used for import paths
//!
//! All structs are `serde`-friendly so they can be loaded from YAML/JSON; missing
//! fields fall back to the defaults below.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub scope: ScopeConfig,
    pub codegen: CodegenConfig,
    pub modules: ModuleConfig,
}

impl CompilerConfig {
    /// Rejects degenerate values that would produce unloadable output.
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("codegen.default_base", &self.codegen.default_base),
            ("codegen.runtime_object", &self.codegen.runtime_object),
            ("codegen.unresolved_sentinel", &self.codegen.unresolved_sentinel),
            ("codegen.loader_object", &self.codegen.loader_object),
            ("modules.source_extension", &self.modules.source_extension),
            ("modules.target_extension", &self.modules.target_extension),
        ];
        for (key, value) in names {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("`{key}` must not be empty")));
            }
        }
        if self.codegen.indent_width == 0 {
            return Err(Error::InvalidConfig(
                "`codegen.indent_width` must be greater than 0".into(),
            ));
        }
        if let Some(bad) = self.scope.builtin_names.iter().find(|n| n.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "`scope.builtin_names` contains an empty entry: {bad:?}"
            )));
        }
        Ok(())
    }
}

/// Scope resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Names treated as declared everywhere (self/parent references and runtime globals).
    pub builtin_names: Vec<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            builtin_names: ["this", "parent", "Element", "Container", "import", "vlog", "console"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ScopeConfig {
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin_names.iter().any(|b| b == name)
    }
}

/// Names the generated code relies on at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Base class for declarations without heritage.
    pub default_base: String,
    /// Object exposing `addProperty`, `assignPropertyExpression`, ...
    pub runtime_object: String,
    /// Path emitted for imports that could not be resolved.
    pub unresolved_sentinel: String,
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Object exposing `require` / `requireAs` for module imports.
    pub loader_object: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            default_base: "Element".into(),
            runtime_object: "Element".into(),
            unresolved_sentinel: "__UNRESOLVED__".into(),
            indent_width: 4,
            loader_object: "imports".into(),
        }
    }
}

/// File naming used when computing import paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    pub source_extension: String,
    pub target_extension: String,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            source_extension: "lv".into(),
            target_extension: "js".into(),
        }
    }
}

impl ModuleConfig {
    /// Generated file name of a unit, e.g. `Button.lv.js`.
    pub fn target_file_name(&self, unit: &str) -> String {
        format!("{unit}.{}.{}", self.source_extension, self.target_extension)
    }

    /// Unit name from a file name: `Button.lv` -> `Button`.
    pub fn unit_name<'a>(&self, file_name: &'a str) -> &'a str {
        file_name
            .strip_suffix(self.source_extension.as_str())
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(file_name)
    }
}
