//! JSON manifest of the module graph.
//!
//! Units get ordinal ids (0..N-1) in graph order; edges refer to those ids.

use crate::graph::ModuleGraph;
use crate::registry::ModuleId;
use crate::unit::UnitState;
use anyhow::{Context, Result};
use elements_compiler::ExportEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphManifest {
    pub modules: Vec<ModuleRecord>,
    pub units: Vec<UnitRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub import_id: String,
    pub units: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: usize,
    pub name: String,
    pub module: String,
    pub file: String,
    pub state: UnitState,
    pub exports: Vec<ExportEntry>,
    pub imports: Vec<ImportRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub uri: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub alias: String,
    pub is_relative: bool,
    /// Import id of the module the import is bound to.
    pub module: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub src: usize,
    pub dst: usize,
}

impl ModuleGraph {
    pub fn manifest(&self) -> GraphManifest {
        let ordinal: HashMap<_, _> = self.units().enumerate().map(|(i, (id, _))| (id, i)).collect();
        let import_id = |m: ModuleId| self.module(m).map(|m| m.import_id().to_string()).unwrap_or_default();

        let units = self
            .units()
            .enumerate()
            .map(|(i, (_, u))| UnitRecord {
                id: i,
                name: u.name().to_string(),
                module: import_id(u.module()),
                file: u.target_file_name(),
                state: u.state(),
                exports: u.exports().to_vec(),
                imports: u
                    .imports()
                    .iter()
                    .map(|imp| ImportRecord {
                        uri: imp.entry.uri.clone(),
                        alias: imp.entry.alias.clone(),
                        is_relative: imp.entry.is_relative,
                        module: imp.module.map(|m| import_id(m)),
                    })
                    .collect(),
            })
            .collect();

        let modules = self
            .registry()
            .iter()
            .map(|(_, m)| ModuleRecord {
                import_id: m.import_id().to_string(),
                units: m.units().iter().filter_map(|u| ordinal.get(u).copied()).collect(),
            })
            .collect();

        let edges = self
            .edges()
            .into_iter()
            .filter_map(|(s, d)| {
                Some(EdgeRecord {
                    src: *ordinal.get(&s)?,
                    dst: *ordinal.get(&d)?,
                })
            })
            .collect();

        GraphManifest { modules, units, edges }
    }
}

/// Write the manifest of `graph` as pretty JSON to `path`.
pub fn write_manifest(path: &Path, graph: &ModuleGraph) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, &graph.manifest())?;
    w.write_all(b"\n")?;
    w.flush()?;
    info!("manifest: wrote -> {}", path.display());
    Ok(())
}
