//! One compilation unit: source text, its AST and the queries module loaders
//! run against it.

use crate::builder::build_ast;
use crate::codegen::{Edit, Generator, apply_edits};
use crate::config::model::CompilerConfig;
use crate::core::debug_ast::maybe_debug_ast;
use crate::cst::CstNode;
use crate::cst::owned::OwnedCst;
use crate::errors::Result;
use crate::model::arena::Ast;
use crate::model::ast::NodeKind;
use crate::model::module::{ExportEntry, ExportKind, ImportEntry};
use crate::scope::import_types::{ImportTypeTable, collect_import_types};
use std::cell::OnceCell;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug)]
pub struct SourceUnit {
    name: String,
    source: String,
    ast: Ast,
    config: Arc<CompilerConfig>,
    import_types: OnceCell<ImportTypeTable>,
    /// Resolved module path per import statement, by position.
    import_paths: Vec<Option<String>>,
}

impl SourceUnit {
    /// Builds the unit from any CST. Fails on the first syntax error.
    #[instrument(level = "info", skip_all, fields(unit = %name.as_ref()))]
    pub fn build<N: CstNode>(
        name: impl AsRef<str>,
        source: impl Into<String>,
        root: N,
        config: Arc<CompilerConfig>,
    ) -> Result<Self> {
        let name = name.as_ref().to_string();
        let source = source.into();
        let ast = build_ast(root, &source, &name)?;

        maybe_debug_ast(&name, &ast, &source);
        info!(nodes = ast.len(), diagnostics = ast.diagnostics.len(), "unit built");

        Ok(Self {
            import_paths: vec![None; ast.imports.len()],
            name,
            source,
            ast,
            config,
            import_types: OnceCell::new(),
        })
    }

    /// Builds the unit from a CST shipped as [`OwnedCst`].
    pub fn from_owned_cst(
        name: impl AsRef<str>,
        source: impl Into<String>,
        cst: &OwnedCst,
        config: Arc<CompilerConfig>,
    ) -> Result<Self> {
        Self::build(name, source, cst.root_node(), config)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Exported components and bound root instances, in source order.
    pub fn exports(&self) -> Vec<ExportEntry> {
        self.ast
            .exports
            .iter()
            .filter_map(|&id| {
                let (name, kind) = match self.ast.kind(id)? {
                    NodeKind::ComponentDeclaration(d) => (d.name?, ExportKind::Component),
                    NodeKind::ComponentInstance(i) => (i.instance_name?, ExportKind::Element),
                    _ => return None,
                };
                let name = match self.ast.slice(name, &self.source) {
                    "default" => self.name.as_str(),
                    other => other,
                };
                (!name.is_empty()).then(|| ExportEntry {
                    name: name.to_string(),
                    kind,
                })
            })
            .collect()
    }

    /// Import statements, in source order.
    pub fn imports(&self) -> Vec<ImportEntry> {
        self.ast
            .imports
            .iter()
            .filter_map(|&id| match self.ast.kind(id)? {
                NodeKind::Import(data) => Some(ImportEntry {
                    uri: self.ast.dotted(&data.path, &self.source),
                    alias: self.ast.slice_opt(data.alias, &self.source).to_string(),
                    is_relative: data.is_relative,
                }),
                _ => None,
            })
            .collect()
    }

    /// External symbols the unit needs, computed on first use.
    pub fn import_types(&self) -> &ImportTypeTable {
        self.import_types
            .get_or_init(|| collect_import_types(&self.ast, &self.source, &self.config.scope))
    }

    /// Records the path `(namespace, name)` is loaded from. False if the unit
    /// does not need that symbol.
    pub fn resolve_import_type(&mut self, namespace: &str, name: &str, path: impl Into<String>) -> bool {
        self.import_types();
        self.import_types
            .get_mut()
            .is_some_and(|table| table.resolve(namespace, name, path))
    }

    /// Records the module path of the `index`-th import statement.
    pub fn resolve_import(&mut self, index: usize, path: impl Into<String>) -> bool {
        match self.import_paths.get_mut(index) {
            Some(slot) => {
                *slot = Some(path.into());
                true
            }
            None => false,
        }
    }

    pub fn import_paths(&self) -> &[Option<String>] {
        &self.import_paths
    }

    /// Edits turning the unit's source into target code.
    pub fn generate(&self) -> Vec<Edit> {
        Generator::new(&self.ast, &self.source, &self.name, &self.config.codegen)
            .with_import_types(self.import_types())
            .with_import_paths(&self.import_paths)
            .generate()
    }

    /// Target code of the unit.
    #[instrument(level = "debug", skip_all, fields(unit = %self.name))]
    pub fn to_js(&self) -> Result<String> {
        let unresolved = self.import_types().unresolved();
        if !unresolved.is_empty() {
            let names: Vec<String> = unresolved
                .iter()
                .map(|t| match t.namespace.as_str() {
                    "" => t.name.clone(),
                    ns => format!("{ns}.{}", t.name),
                })
                .collect();
            warn!(unit = %self.name, names = ?names, "unresolved import types");
        }
        apply_edits(&self.source, &self.generate())
    }

    pub fn dump(&self) -> String {
        self.ast.dump(&self.source)
    }
}
