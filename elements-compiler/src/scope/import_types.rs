//! Import-type table: the external symbols a unit needs from other units.
//!
//! Built once per unit from the used identifiers reachable from its exported
//! nodes. Names that do not resolve locally become entries, either unqualified
//! (namespace `""`) or qualified by an import alias when they are written as
//! `Alias.Symbol` in a heritage chain, member access or instance name.
//! The module resolver later fills `resolved_path` on each entry.

use crate::config::model::ScopeConfig;
use crate::model::arena::Ast;
use crate::model::ast::{NodeId, NodeKind};
use crate::scope::undeclared_identifiers;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, btree_map};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportType {
    pub name: String,
    /// Import alias qualifying the symbol, empty for unqualified names.
    pub namespace: String,
    /// Module path the symbol is loaded from, once resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<String>,
}

impl ImportType {
    pub fn is_resolved(&self) -> bool {
        self.resolved_path.is_some()
    }
}

/// `namespace -> symbol -> entry`, ordered for deterministic output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTypeTable {
    namespaces: BTreeMap<String, BTreeMap<String, ImportType>>,
}

impl ImportTypeTable {
    /// Adds `(namespace, name)` unless present. Returns true when inserted.
    pub fn insert(&mut self, namespace: &str, name: &str) -> bool {
        let symbols = self.namespaces.entry(namespace.to_string()).or_default();
        if symbols.contains_key(name) {
            return false;
        }
        symbols.insert(
            name.to_string(),
            ImportType {
                name: name.to_string(),
                namespace: namespace.to_string(),
                resolved_path: None,
            },
        );
        true
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<&ImportType> {
        self.namespaces.get(namespace)?.get(name)
    }

    /// Records where `(namespace, name)` is loaded from. False if unknown.
    pub fn resolve(&mut self, namespace: &str, name: &str, path: impl Into<String>) -> bool {
        match self.namespaces.get_mut(namespace).and_then(|s| s.get_mut(name)) {
            Some(entry) => {
                entry.resolved_path = Some(path.into());
                true
            }
            None => false,
        }
    }

    /// Namespaces with their entries, unqualified (`""`) first.
    pub fn namespaces(&self) -> impl Iterator<Item = (&str, btree_map::Values<'_, String, ImportType>)> {
        self.namespaces.iter().map(|(ns, symbols)| (ns.as_str(), symbols.values()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImportType> {
        self.namespaces.values().flat_map(|s| s.values())
    }

    /// Entries still waiting for a module path.
    pub fn unresolved(&self) -> Vec<ImportType> {
        self.iter().filter(|t| !t.is_resolved()).cloned().collect()
    }

    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.namespaces.get(namespace).is_some_and(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One line per namespace: `Imports as 'N': A B`.
    pub fn describe(&self) -> String {
        self.namespaces
            .iter()
            .map(|(ns, symbols)| {
                let names: Vec<&str> = symbols.keys().map(String::as_str).collect();
                format!("Imports as '{ns}': {}", names.join(" "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Walks every scope under the unit's exported nodes and classifies each
/// unresolved name.
#[instrument(level = "debug", skip_all)]
pub fn collect_import_types(ast: &Ast, source: &str, builtins: &ScopeConfig) -> ImportTypeTable {
    let aliases: BTreeSet<&str> = ast
        .imports
        .iter()
        .filter_map(|&imp| match ast.kind(imp) {
            Some(NodeKind::Import(data)) => data.alias.map(|a| ast.slice(a, source)),
            _ => None,
        })
        .collect();

    let mut table = ImportTypeTable::default();
    for &export in &ast.exports {
        for node in ast.descendants(export) {
            for ident in undeclared_identifiers(ast, source, node, builtins) {
                let name = ast.slice(ident, source);
                if aliases.contains(name) {
                    if let Some(symbol) = qualified_symbol(ast, ident) {
                        table.insert(name, ast.slice(symbol, source));
                    }
                } else {
                    table.insert("", name);
                }
            }
        }
    }
    debug!(entries = table.len(), "import types collected");
    table
}

/// Second segment of `Alias.Symbol` when `ident` is the alias heading a heritage
/// chain, a member access or an instance type name.
fn qualified_symbol(ast: &Ast, ident: NodeId) -> Option<NodeId> {
    let parent = ast.parent(ident)?;
    match ast.kind(parent)? {
        NodeKind::ComponentHeritage | NodeKind::MemberExpression => {
            let children = ast.children(parent);
            (children.len() > 1 && children[0] == ident).then(|| children[1])
        }
        NodeKind::ComponentInstance(inst) => {
            (inst.name.len() > 1 && inst.name[0] == ident).then(|| inst.name[1])
        }
        _ => None,
    }
}
