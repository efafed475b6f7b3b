//! Module units: one compiled source file inside a module.

use crate::registry::ModuleId;
use elements_compiler::{ExportEntry, ImportEntry, SourceUnit};
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable handle of a unit; survives removal of other units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub(crate) NodeIndex);

impl UnitId {
    pub fn index(&self) -> usize {
        self.0.index()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    /// AST built, imports not resolved yet.
    Initialized,
    /// Import types resolved against the graph.
    Parsed,
    /// Target code generated.
    Compiled,
}

impl Display for UnitState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UnitState::Initialized => "initialized",
            UnitState::Parsed => "parsed",
            UnitState::Compiled => "compiled",
        })
    }
}

/// An import statement and the module the loader bound it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundImport {
    pub entry: ImportEntry,
    pub module: Option<ModuleId>,
}

#[derive(Debug)]
pub struct ModuleUnit {
    module: ModuleId,
    source: SourceUnit,
    pub(crate) state: UnitState,
    exports: Vec<ExportEntry>,
    pub(crate) imports: Vec<BoundImport>,
    pub(crate) output: Option<String>,
}

impl ModuleUnit {
    pub(crate) fn new(module: ModuleId, source: SourceUnit) -> Self {
        let exports = source.exports();
        let imports = source
            .imports()
            .into_iter()
            .map(|entry| BoundImport { entry, module: None })
            .collect();
        Self {
            module,
            source,
            state: UnitState::Initialized,
            exports,
            imports,
            output: None,
        }
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn exports(&self) -> &[ExportEntry] {
        &self.exports
    }

    pub fn imports(&self) -> &[BoundImport] {
        &self.imports
    }

    pub fn exports_name(&self, name: &str) -> bool {
        self.exports.iter().any(|e| e.name == name)
    }

    pub fn source_unit(&self) -> &SourceUnit {
        &self.source
    }

    pub(crate) fn source_unit_mut(&mut self) -> &mut SourceUnit {
        &mut self.source
    }

    /// Generated code, once compiled.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Name of the generated file, e.g. `Button.lv.js`.
    pub fn target_file_name(&self) -> String {
        self.source.config().modules.target_file_name(self.name())
    }
}
