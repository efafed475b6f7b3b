//! Import header and import statement rewriting.

use super::Generator;
use super::edit::Edit;
use crate::model::ast::{NodeId, NodeKind};

impl Generator<'_> {
    /// ES imports for every entry of the import-type table, inserted at the
    /// top of the unit. Namespaced symbols are imported under a mangled name
    /// and regrouped into an object carrying the namespace's alias.
    pub(super) fn imports_header(&self) -> Option<String> {
        let table = self.import_types.filter(|t| !t.is_empty())?;
        let sentinel = self.config.unresolved_sentinel.as_str();

        let mut out = String::new();
        for (namespace, symbols) in table.namespaces() {
            let symbols: Vec<_> = symbols.collect();
            if symbols.is_empty() {
                continue;
            }
            if namespace.is_empty() {
                for t in symbols {
                    let path = t.resolved_path.as_deref().unwrap_or(sentinel);
                    out.push_str(&format!("import {{{}}} from '{path}'\n", t.name));
                }
                continue;
            }
            let mut members = Vec::with_capacity(symbols.len());
            for t in symbols {
                let path = t.resolved_path.as_deref().unwrap_or(sentinel);
                let local = format!("__{namespace}__{}", t.name);
                out.push_str(&format!("import {{{} as {local}}} from '{path}'\n", t.name));
                members.push(format!("{}:{local}", t.name));
            }
            out.push_str(&format!("let {namespace} = {{{}}}\n", members.join(", ")));
        }
        out.push('\n');
        Some(out)
    }

    /// Rewrites the `index`-th import statement. An alias already provided by
    /// the header is dropped; any other import becomes a loader call.
    pub(super) fn import_statement(&self, index: usize, import: NodeId) -> Option<Edit> {
        let Some(NodeKind::Import(data)) = self.ast.kind(import) else {
            return None;
        };
        let span = self.ast.span(import);
        let path = self
            .import_paths
            .get(index)
            .and_then(Option::as_deref)
            .unwrap_or(&self.config.unresolved_sentinel);
        let loader = &self.config.loader_object;

        let text = match data.alias.map(|a| self.text(a)) {
            Some(alias) if self.import_types.is_some_and(|t| t.contains_namespace(alias)) => String::new(),
            Some(alias) => format!("var {alias} = {loader}.requireAs('{path}')\n"),
            None => format!("{loader}.require('{path}')\n"),
        };
        Some(Edit::replace(span, text))
    }
}
