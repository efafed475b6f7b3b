//! Project file: which modules exist and where their units live.
//!
//! ```yaml
//! out_dir: build
//! compiler:
//!   codegen:
//!     indent_width: 2
//! modules:
//!   - import_id: app
//!     units:
//!       - source: app/Main.lv
//!         cst: app/Main.lv.cst.json
//! ```
//!
//! Paths are relative to the project file. Each unit's CST is the JSON form of
//! `OwnedCst` produced by the grammar bridge.

use anyhow::{Context, Result, bail};
use elements_compiler::{CompilerConfig, OwnedCst};
use module_graph::{ModuleGraph, UnitId, export};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Overrides `ELEMENTS_CONFIG` / defaults when present.
    #[serde(default)]
    pub compiler: Option<CompilerConfig>,
    pub modules: Vec<ModuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub import_id: String,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub source: PathBuf,
    pub cst: PathBuf,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("build")
}

/// What a build produced.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub out_dir: String,
    pub files: Vec<String>,
    pub manifest: String,
    pub graphml: String,
}

impl Project {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let project: Project =
            serde_yml::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
        if project.modules.is_empty() {
            bail!("{} declares no modules", path.display());
        }
        Ok(project)
    }

    /// Compiler settings: the project's own, else `ELEMENTS_CONFIG`, else defaults.
    pub fn compiler_config(&self) -> Result<CompilerConfig> {
        match &self.compiler {
            Some(cfg) => {
                cfg.validate()?;
                Ok(cfg.clone())
            }
            None => Ok(elements_compiler::config::load_from_env_or_default()?),
        }
    }
}

/// Loads every unit, links and compiles the graph, and writes the generated
/// files plus graph exports under `out_dir`.
#[tracing::instrument(level = "info", skip_all, fields(project = %project_file.display()))]
pub fn build(project_file: &Path) -> Result<BuildReport> {
    let project = Project::load(project_file)?;
    let root = project_file.parent().unwrap_or_else(|| Path::new("."));
    let config = Arc::new(project.compiler_config()?);
    let mut graph = ModuleGraph::new(config);

    let mut units: Vec<UnitId> = Vec::new();
    for entry in &project.modules {
        let module = graph.add_module(&entry.import_id)?;
        for unit in &entry.units {
            let source_path = root.join(&unit.source);
            let source = fs::read_to_string(&source_path)
                .with_context(|| format!("read {}", source_path.display()))?;
            let cst_path = root.join(&unit.cst);
            let cst_text =
                fs::read_to_string(&cst_path).with_context(|| format!("read {}", cst_path.display()))?;
            let cst = OwnedCst::from_json(&cst_text).with_context(|| format!("parse {}", cst_path.display()))?;
            let file_name = source_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let id = graph
                .add_unit_from_owned(module, &file_name, &source, &cst)
                .with_context(|| format!("build {}", source_path.display()))?;
            units.push(id);
        }
    }
    info!(modules = project.modules.len(), units = units.len(), "project loaded");

    for &unit in &units {
        let missing = graph.link_imports(unit)?;
        if !missing.is_empty() {
            warn!(?missing, "imports left unbound");
        }
    }
    let order = graph.compile_all()?;

    let out_dir = root.join(&project.out_dir);
    let mut files = Vec::with_capacity(order.len());
    for unit in order {
        let unit = graph.require_unit(unit)?;
        let module = graph
            .module(unit.module())
            .map(|m| m.import_id().replace('.', "/"))
            .unwrap_or_default();
        let dir = out_dir.join(module);
        fs::create_dir_all(&dir).with_context(|| format!("create_dir_all {}", dir.display()))?;
        let path = dir.join(unit.target_file_name());
        fs::write(&path, unit.output().unwrap_or_default())
            .with_context(|| format!("write {}", path.display()))?;
        files.push(path.display().to_string());
    }

    let manifest = out_dir.join("modules.json");
    export::write_manifest(&manifest, &graph)?;
    let graphml = out_dir.join("modules.graphml");
    export::write_graphml(&graphml, &graph)?;
    info!(files = files.len(), out_dir = %out_dir.display(), "build finished");

    Ok(BuildReport {
        out_dir: out_dir.display().to_string(),
        files,
        manifest: manifest.display().to_string(),
        graphml: graphml.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use elements_compiler::cst::owned::{leaf, node, token};

    fn write_unit(dir: &Path, name: &str, base: Option<&str>) {
        let src = match base {
            Some(b) => format!("component {name} < {b} {{ }}"),
            None => format!("component {name} {{ }}"),
        };
        let mut parts = vec![token("component"), leaf("identifier", name)];
        if let Some(b) = base {
            parts.push(node("component_heritage", vec![token("<"), leaf("identifier", b)]));
        }
        parts.push(node("component_body", vec![token("{"), token("}")]));
        let cst = node("program", vec![node("component_declaration", parts)])
            .layout(&src)
            .expect("layout");
        fs::write(dir.join(format!("{name}.lv")), &src).expect("source");
        fs::write(dir.join(format!("{name}.lv.cst.json")), cst.to_json().expect("json")).expect("cst");
    }

    #[test]
    fn builds_a_project_into_module_folders() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = dir.path().join("app");
        fs::create_dir_all(&app).expect("app dir");
        write_unit(&app, "Base", None);
        write_unit(&app, "Button", Some("Base"));
        fs::write(
            dir.path().join("project.yaml"),
            "out_dir: out\nmodules:\n  - import_id: app.ui\n    units:\n      - { source: app/Base.lv, cst: app/Base.lv.cst.json }\n      - { source: app/Button.lv, cst: app/Button.lv.cst.json }\n",
        )
        .expect("project");

        let report = build(&dir.path().join("project.yaml")).expect("build");
        assert_eq!(report.files.len(), 2);

        let button = fs::read_to_string(dir.path().join("out/app/ui/Button.lv.js")).expect("button");
        assert!(button.starts_with("import {Base} from './Base.lv.js'\n"));
        assert!(button.contains("export class Button extends Base{"));
        assert!(Path::new(&report.manifest).exists());
        assert!(Path::new(&report.graphml).exists());
    }

    #[test]
    fn empty_projects_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("project.yaml");
        fs::write(&path, "modules: []\n").expect("write");
        assert!(Project::load(&path).is_err());
    }
}
