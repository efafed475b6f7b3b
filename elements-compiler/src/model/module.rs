//! Per-unit queries consumed by module loaders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// A component declaration (exported class).
    Component,
    /// A root component instance (exported object).
    Element,
}

/// Something a unit makes available to other units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportEntry {
    pub name: String,
    pub kind: ExportKind,
}

/// One `import` statement of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportEntry {
    /// Dotted module id, e.g. `ui.controls`.
    pub uri: String,
    /// Namespace alias (`import a.b as N`), empty when absent.
    #[serde(default)]
    pub alias: String,
    /// `import .a.b` form: resolved against the importing module.
    #[serde(default)]
    pub is_relative: bool,
}

impl ImportEntry {
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.uri.split('.').filter(|s| !s.is_empty())
    }
}
