//! Dependency graph between module units.
//!
//! Units are the nodes of a `StableDiGraph`; an edge `a -> b` means unit `a`
//! imports something `b` exports. The edge set is acyclic at all times: every
//! insertion is checked against the current edges first and only committed
//! when no path leads back to the importer.

use crate::errors::{DependencyCycleError, GraphError, Result};
use crate::registry::{Module, ModuleId, ModuleRegistry, target_import_id};
use crate::unit::{ModuleUnit, UnitId};
use elements_compiler::{CompilerConfig, CstNode, OwnedCst, SourceUnit};
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub struct ModuleGraph {
    config: Arc<CompilerConfig>,
    registry: ModuleRegistry,
    units: StableDiGraph<ModuleUnit, ()>,
}

impl Default for ModuleGraph {
    fn default() -> Self {
        Self::new(Arc::new(CompilerConfig::default()))
    }
}

impl ModuleGraph {
    pub fn new(config: Arc<CompilerConfig>) -> Self {
        Self {
            config,
            registry: ModuleRegistry::default(),
            units: StableDiGraph::new(),
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn add_module(&mut self, import_id: &str) -> Result<ModuleId> {
        self.registry.add(import_id)
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.registry.get(id)
    }

    /// Builds a unit from its CST and adds it to `module`. `file_name` may
    /// carry the source extension (`Button.lv`).
    pub fn add_unit<N: CstNode>(&mut self, module: ModuleId, file_name: &str, source: &str, root: N) -> Result<UnitId> {
        self.registry.require(module)?;
        let name = self.config.modules.unit_name(file_name);
        let source = SourceUnit::build(name, source, root, Arc::clone(&self.config))?;
        let id = UnitId(self.units.add_node(ModuleUnit::new(module, source)));
        if let Some(m) = self.registry.get_mut(module) {
            m.units.push(id);
        }
        debug!(unit = name, module = ?module, "unit added");
        Ok(id)
    }

    pub fn add_unit_from_owned(&mut self, module: ModuleId, file_name: &str, source: &str, cst: &OwnedCst) -> Result<UnitId> {
        self.add_unit(module, file_name, source, cst.root_node())
    }

    pub fn unit(&self, id: UnitId) -> Option<&ModuleUnit> {
        self.units.node_weight(id.0)
    }

    pub fn require_unit(&self, id: UnitId) -> Result<&ModuleUnit> {
        self.unit(id).ok_or(GraphError::UnknownUnit(id))
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Result<&mut ModuleUnit> {
        self.units.node_weight_mut(id.0).ok_or(GraphError::UnknownUnit(id))
    }

    pub fn units(&self) -> impl Iterator<Item = (UnitId, &ModuleUnit)> {
        self.units.node_indices().map(|i| (UnitId(i), &self.units[i]))
    }

    pub fn unit_count(&self) -> usize {
        self.units.node_count()
    }

    /// Unit of `module` exporting `name`.
    pub fn find_export(&self, module: ModuleId, name: &str) -> Option<UnitId> {
        self.registry
            .get(module)?
            .units()
            .iter()
            .copied()
            .find(|&u| self.unit(u).is_some_and(|unit| unit.exports_name(name)))
    }

    /// Binds every import of `unit` whose uri is `uri` to `module`.
    pub fn bind_import(&mut self, unit: UnitId, uri: &str, module: ModuleId) -> Result<usize> {
        let import_id = self.registry.require(module)?.import_id().to_string();
        let target = self.unit_mut(unit)?;
        let mut bound = Vec::new();
        for (index, import) in target.imports.iter_mut().enumerate() {
            if import.entry.uri == uri {
                import.module = Some(module);
                bound.push(index);
            }
        }
        for &index in &bound {
            target.source_unit_mut().resolve_import(index, import_id.clone());
        }
        Ok(bound.len())
    }

    /// Binds the imports of `unit` to registered modules by import id.
    /// Returns the uris that matched no module.
    pub fn link_imports(&mut self, unit: UnitId) -> Result<Vec<String>> {
        let importer = self.unit_module_id(unit)?;
        let entries: Vec<_> = self.require_unit(unit)?.imports().iter().map(|i| i.entry.clone()).collect();
        let mut missing = Vec::new();
        for entry in entries {
            match self.registry.find(&target_import_id(&importer, &entry)) {
                Some(module) => {
                    self.bind_import(unit, &entry.uri, module)?;
                }
                None => missing.push(entry.uri),
            }
        }
        if !missing.is_empty() {
            warn!(unit = self.require_unit(unit)?.name(), missing = ?missing, "imports without a module");
        }
        Ok(missing)
    }

    pub(crate) fn unit_module_id(&self, unit: UnitId) -> Result<String> {
        let module = self.require_unit(unit)?.module();
        Ok(self.registry.require(module)?.import_id().to_string())
    }

    /// Adds `from -> to` unless it would close a cycle.
    ///
    /// Returns false for a self edge or an edge already present. On a cycle
    /// the graph is left untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn add_dependency(&mut self, from: UnitId, to: UnitId) -> Result<bool> {
        self.require_unit(from)?;
        self.require_unit(to)?;
        if from == to || self.units.contains_edge(from.0, to.0) {
            return Ok(false);
        }
        if let Some(back) = self.path_between(to.0, from.0) {
            let mut path = vec![self.units[from.0].name().to_string()];
            path.extend(back.into_iter().map(|n| self.units[n].name().to_string()));
            let err = DependencyCycleError { path };
            warn!(cycle = %err, "dependency rejected");
            return Err(err.into());
        }
        self.units.add_edge(from.0, to.0, ());
        Ok(true)
    }

    /// Depth-first search for a path `start ..= goal` along dependency edges.
    fn path_between(&self, start: NodeIndex, goal: NodeIndex) -> Option<Vec<NodeIndex>> {
        let mut visited = HashSet::new();
        let mut path = vec![start];
        let mut stack = vec![self.units.neighbors_directed(start, Direction::Outgoing).detach()];
        visited.insert(start);
        if start == goal {
            return Some(path);
        }
        while let Some(walker) = stack.last_mut() {
            match walker.next_node(&self.units) {
                Some(next) if next == goal => {
                    path.push(next);
                    return Some(path);
                }
                Some(next) => {
                    if visited.insert(next) {
                        path.push(next);
                        stack.push(self.units.neighbors_directed(next, Direction::Outgoing).detach());
                    }
                }
                None => {
                    stack.pop();
                    path.pop();
                }
            }
        }
        None
    }

    /// Units `unit` depends on.
    pub fn dependencies(&self, unit: UnitId) -> Vec<UnitId> {
        self.neighbors(unit, Direction::Outgoing)
    }

    /// Units depending on `unit`.
    pub fn dependents(&self, unit: UnitId) -> Vec<UnitId> {
        self.neighbors(unit, Direction::Incoming)
    }

    fn neighbors(&self, unit: UnitId, dir: Direction) -> Vec<UnitId> {
        let mut out: Vec<UnitId> = self.units.neighbors_directed(unit.0, dir).map(UnitId).collect();
        out.sort();
        out
    }

    /// All edges as `(importer, exporter)`.
    pub fn edges(&self) -> Vec<(UnitId, UnitId)> {
        let mut out: Vec<_> = self
            .units
            .edge_references()
            .map(|e| (UnitId(e.source()), UnitId(e.target())))
            .collect();
        out.sort();
        out
    }

    pub fn edge_count(&self) -> usize {
        self.units.edge_count()
    }

    /// Unloads `module`: its units, every edge touching them, and import
    /// bindings other units held to it.
    #[instrument(level = "info", skip(self))]
    pub fn remove_module(&mut self, module: ModuleId) -> Result<Vec<UnitId>> {
        let removed = self.registry.remove(module).ok_or(GraphError::UnknownModule(module))?;
        for &unit in &removed.units {
            self.units.remove_node(unit.0);
        }
        for index in self.units.node_indices().collect::<Vec<_>>() {
            for import in &mut self.units[index].imports {
                if import.module == Some(module) {
                    import.module = None;
                }
            }
        }
        info!(units = removed.units.len(), "module removed");
        Ok(removed.units)
    }

    /// Units ordered so every unit comes after the units it depends on.
    pub fn compile_order(&self) -> Result<Vec<UnitId>> {
        let mut order = toposort(&self.units, None).map_err(|cycle| DependencyCycleError {
            path: vec![self.units[cycle.node_id()].name().to_string()],
        })?;
        order.reverse();
        Ok(order.into_iter().map(UnitId).collect())
    }
}
