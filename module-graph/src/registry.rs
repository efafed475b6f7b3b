//! Module registry.
//!
//! A module (package or plugin) is addressed by a dotted import id such as
//! `app.ui.controls`; its first segment names the package. Modules own units
//! and are the targets import statements are bound to.

use crate::errors::{GraphError, Result};
use crate::unit::UnitId;
use elements_compiler::ImportEntry;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    import_id: String,
    pub(crate) units: Vec<UnitId>,
}

impl Module {
    pub fn import_id(&self) -> &str {
        &self.import_id
    }

    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    /// First segment of the import id.
    pub fn package(&self) -> &str {
        package_of(&self.import_id)
    }
}

#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<Option<Module>>,
    by_import_id: HashMap<String, ModuleId>,
}

impl ModuleRegistry {
    pub fn add(&mut self, import_id: &str) -> Result<ModuleId> {
        if self.by_import_id.contains_key(import_id) {
            return Err(GraphError::DuplicateModule(import_id.to_string()));
        }
        let id = ModuleId(self.modules.len());
        self.modules.push(Some(Module {
            import_id: import_id.to_string(),
            units: Vec::new(),
        }));
        self.by_import_id.insert(import_id.to_string(), id);
        debug!(import_id, "module registered");
        Ok(id)
    }

    pub fn get(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: ModuleId) -> Option<&mut Module> {
        self.modules.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn require(&self, id: ModuleId) -> Result<&Module> {
        self.get(id).ok_or(GraphError::UnknownModule(id))
    }

    pub fn find(&self, import_id: &str) -> Option<ModuleId> {
        self.by_import_id.get(import_id).copied()
    }

    pub(crate) fn remove(&mut self, id: ModuleId) -> Option<Module> {
        let module = self.modules.get_mut(id.0)?.take()?;
        self.by_import_id.remove(&module.import_id);
        Some(module)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.as_ref().map(|m| (ModuleId(i), m)))
    }

    pub fn len(&self) -> usize {
        self.by_import_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_import_id.is_empty()
    }
}

pub(crate) fn package_of(import_id: &str) -> &str {
    import_id.split('.').next().unwrap_or_default()
}

/// Import id an import statement refers to. Relative imports are rooted at
/// the importing module's package.
pub fn target_import_id(importer: &str, entry: &ImportEntry) -> String {
    if !entry.is_relative {
        return entry.uri.clone();
    }
    let mut segments = vec![package_of(importer)];
    segments.extend(entry.segments());
    segments.join(".")
}

/// Path of `file` in module `target` as seen from module `importer`.
///
/// Absolute imports are addressed by import id. Relative imports climb one
/// level per segment of the importer below its package, then descend into
/// the target below its package.
pub fn import_path(importer: &str, target: &str, file: &str, is_relative: bool) -> String {
    if !is_relative {
        return format!("{target}/{file}");
    }
    let depth = importer.split('.').skip(1).filter(|s| !s.is_empty()).count();
    let up = if depth == 0 {
        ".".to_string()
    } else {
        vec![".."; depth].join("/")
    };
    let down: Vec<&str> = target.split('.').skip(1).filter(|s| !s.is_empty()).collect();
    if down.is_empty() {
        format!("{up}/{file}")
    } else {
        format!("{up}/{}/{file}", down.join("/"))
    }
}
