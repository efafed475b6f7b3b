//! Cross-unit resolution and compilation.
//!
//! For every entry of a unit's import-type table the exporter is searched in
//! the unit's own module first (unqualified names only), then in the modules
//! its import statements are bound to, matching the entry's namespace against
//! the import alias. A hit records the path the generated code loads the
//! symbol from and adds a dependency edge.

use crate::errors::Result;
use crate::graph::ModuleGraph;
use crate::registry::import_path;
use crate::unit::{UnitId, UnitState};
use elements_compiler::ImportType;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Outcome of [`ModuleGraph::resolve_types`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveSummary {
    pub resolved: usize,
    /// `Namespace.Name` (or `Name`) of entries no module exports.
    pub unresolved: Vec<String>,
}

struct Hit {
    exporter: UnitId,
    path: String,
}

impl ModuleGraph {
    /// Resolves the import types of `unit`. A dependency cycle aborts the
    /// pass; entries resolved before it keep their paths.
    #[instrument(level = "info", skip(self))]
    pub fn resolve_types(&mut self, unit: UnitId) -> Result<ResolveSummary> {
        let entries: Vec<ImportType> = self.require_unit(unit)?.source_unit().import_types().iter().cloned().collect();
        let mut summary = ResolveSummary::default();

        for entry in entries {
            match self.find_exporter(unit, &entry)? {
                Some(hit) => {
                    self.add_dependency(unit, hit.exporter)?;
                    debug!(name = %entry.name, namespace = %entry.namespace, path = %hit.path, "import type resolved");
                    self.unit_mut(unit)?
                        .source_unit_mut()
                        .resolve_import_type(&entry.namespace, &entry.name, hit.path);
                    summary.resolved += 1;
                }
                None => summary.unresolved.push(match entry.namespace.as_str() {
                    "" => entry.name.clone(),
                    ns => format!("{ns}.{}", entry.name),
                }),
            }
        }

        let target = self.unit_mut(unit)?;
        if target.state == UnitState::Initialized {
            target.state = UnitState::Parsed;
        }
        if !summary.unresolved.is_empty() {
            warn!(unit = target.name(), names = ?summary.unresolved, "unresolved import types");
        }
        Ok(summary)
    }

    fn find_exporter(&self, unit: UnitId, entry: &ImportType) -> Result<Option<Hit>> {
        let importer = self.require_unit(unit)?;
        if entry.namespace.is_empty() {
            if let Some(exporter) = self.find_export(importer.module(), &entry.name) {
                let file = self.require_unit(exporter)?.target_file_name();
                return Ok(Some(Hit {
                    exporter,
                    path: format!("./{file}"),
                }));
            }
        }

        let importer_id = self.unit_module_id(unit)?;
        for import in importer.imports() {
            if import.entry.alias != entry.namespace {
                continue;
            }
            let Some(module) = import.module else {
                continue;
            };
            let Some(exporter) = self.find_export(module, &entry.name) else {
                continue;
            };
            let target_id = self.registry().require(module)?.import_id();
            let file = self.require_unit(exporter)?.target_file_name();
            return Ok(Some(Hit {
                exporter,
                path: import_path(&importer_id, target_id, &file, import.entry.is_relative),
            }));
        }
        Ok(None)
    }

    /// Generates the target code of `unit`, resolving it first if needed.
    #[instrument(level = "info", skip(self))]
    pub fn compile(&mut self, unit: UnitId) -> Result<&str> {
        if self.require_unit(unit)?.state() == UnitState::Initialized {
            self.resolve_types(unit)?;
        }
        let js = self.require_unit(unit)?.source_unit().to_js()?;
        let target = self.unit_mut(unit)?;
        target.output = Some(js);
        target.state = UnitState::Compiled;
        Ok(target.output.as_deref().unwrap_or_default())
    }

    /// Resolves every unit, then compiles them dependencies first.
    #[instrument(level = "info", skip(self))]
    pub fn compile_all(&mut self) -> Result<Vec<UnitId>> {
        let units: Vec<UnitId> = self.units().map(|(id, _)| id).collect();
        for &unit in &units {
            if self.require_unit(unit)?.state() == UnitState::Initialized {
                self.resolve_types(unit)?;
            }
        }
        let order = self.compile_order()?;
        for &unit in &order {
            self.compile(unit)?;
        }
        info!(units = order.len(), edges = self.edge_count(), "graph compiled");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GraphError;
    use crate::graph::tests::add;
    use elements_compiler::OwnedCst;
    use elements_compiler::cst::owned::{CstSketch, leaf, node, token};

    fn ident(text: &str) -> CstSketch {
        leaf("identifier", text)
    }

    /// `import <uri> as <alias>\ncomponent <name> < <alias>.<base> { }`
    fn importing(name: &str, uri: &str, relative: bool, alias: &str, base: &str) -> (String, OwnedCst) {
        let dot = if relative { "." } else { "" };
        let src = format!("import {dot}{uri} as {alias}\ncomponent {name} < {alias}.{base} {{ }}");
        let mut import = vec![token("import")];
        if relative {
            import.push(token("."));
        }
        let mut path = Vec::new();
        for (i, seg) in uri.split('.').enumerate() {
            if i > 0 {
                path.push(token("."));
            }
            path.push(ident(seg));
        }
        import.push(node("import_path", path));
        import.push(node("import_as", vec![token("as"), ident(alias)]));
        let sketch = node(
            "program",
            vec![
                node("import_statement", import),
                node(
                    "component_declaration",
                    vec![
                        token("component"),
                        ident(name),
                        node("component_heritage", vec![token("<"), ident(alias), token("."), ident(base)]),
                        node("component_body", vec![token("{"), token("}")]),
                    ],
                ),
            ],
        );
        let cst = sketch.layout(&src).expect("layout");
        (src, cst)
    }

    #[test]
    fn local_exports_resolve_next_to_the_importer() {
        let mut graph = ModuleGraph::default();
        let m = graph.add_module("app").expect("module");
        let base = add(&mut graph, m, "Base", &[]);
        let button = add(&mut graph, m, "Button", &["Base"]);

        let summary = graph.resolve_types(button).expect("resolve");
        assert_eq!(summary.resolved, 1);
        assert!(summary.unresolved.is_empty());
        assert_eq!(graph.dependencies(button), vec![base]);
        assert_eq!(graph.unit(button).map(|u| u.state()), Some(UnitState::Parsed));

        let js = graph.compile(button).expect("compile");
        assert!(js.starts_with("import {Base} from './Base.lv.js'\n"));
    }

    #[test]
    fn namespaced_types_resolve_through_bound_imports() {
        let mut graph = ModuleGraph::default();
        let app = graph.add_module("app.ui").expect("app");
        let shared = graph.add_module("app.shared").expect("shared");
        let style = add(&mut graph, shared, "Style", &[]);

        let (src, cst) = importing("Panel", "shared", true, "S", "Style");
        let panel = graph.add_unit_from_owned(app, "Panel.lv", &src, &cst).expect("unit");
        assert!(graph.link_imports(panel).expect("link").is_empty());

        graph.resolve_types(panel).expect("resolve");
        assert_eq!(graph.dependencies(panel), vec![style]);
        let js = graph.compile(panel).expect("compile").to_string();
        assert!(js.starts_with("import {Style as __S__Style} from '../shared/Style.lv.js'\nlet S = {Style:__S__Style}\n"));
        assert!(js.contains("class Panel extends S.Style{"));
    }

    #[test]
    fn missing_exports_stay_unresolved() {
        let mut graph = ModuleGraph::default();
        let m = graph.add_module("app").expect("module");
        let (src, cst) = importing("Panel", "lib.kit", false, "K", "Frame");
        let panel = graph.add_unit_from_owned(m, "Panel.lv", &src, &cst).expect("unit");
        assert_eq!(graph.link_imports(panel).expect("link"), vec!["lib.kit".to_string()]);

        let summary = graph.resolve_types(panel).expect("resolve");
        assert_eq!(summary.unresolved, vec!["K.Frame".to_string()]);
        let js = graph.compile(panel).expect("compile");
        assert!(js.contains("from '__UNRESOLVED__'"));
    }

    #[test]
    fn cyclic_imports_fail_resolution() {
        let mut graph = ModuleGraph::default();
        let m = graph.add_module("app").expect("module");
        let a = add(&mut graph, m, "A", &["B"]);
        let b = add(&mut graph, m, "B", &["A"]);
        graph.resolve_types(a).expect("a");
        let err = graph.resolve_types(b).unwrap_err();
        assert!(matches!(err, GraphError::DependencyCycle(ref c) if c.path == ["B", "A", "B"]));
        assert_eq!(graph.edges(), vec![(a, b)]);
    }

    #[test]
    fn compile_all_visits_dependencies_first() {
        let mut graph = ModuleGraph::default();
        let m = graph.add_module("app").expect("module");
        let top = add(&mut graph, m, "Top", &["Mid"]);
        let mid = add(&mut graph, m, "Mid", &["Leaf"]);
        let leaf_unit = add(&mut graph, m, "Leaf", &[]);

        let order = graph.compile_all().expect("compile");
        assert_eq!(order, vec![leaf_unit, mid, top]);
        assert!(graph.units().all(|(_, u)| u.state() == UnitState::Compiled && u.output().is_some()));
    }
}
