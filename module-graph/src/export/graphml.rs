//! GraphML exporter for Gephi and similar tools.
//!
//! One node per unit with its name, module and compile state; one directed
//! edge per dependency.

use crate::graph::ModuleGraph;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

/// Write GraphML to `path`.
pub fn write_graphml(path: &Path, graph: &ModuleGraph) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);

    // Stable ids (n0..nN-1)
    let ids: HashMap<_, _> = graph
        .units()
        .enumerate()
        .map(|(i, (id, _))| (id, format!("n{i}")))
        .collect();

    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        w,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns
     http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">"#
    )?;
    writeln!(w, r#"<key id="d0" for="node" attr.name="name" attr.type="string"/>"#)?;
    writeln!(w, r#"<key id="d1" for="node" attr.name="module" attr.type="string"/>"#)?;
    writeln!(w, r#"<key id="d2" for="node" attr.name="state" attr.type="string"/>"#)?;
    writeln!(w, r#"<graph edgedefault="directed">"#)?;

    for (id, unit) in graph.units() {
        let module = graph.module(unit.module()).map(|m| m.import_id()).unwrap_or_default();
        writeln!(w, r#"<node id="{}">"#, ids[&id])?;
        writeln!(w, r#"  <data key="d0">{}</data>"#, xml_escape(unit.name()))?;
        writeln!(w, r#"  <data key="d1">{}</data>"#, xml_escape(module))?;
        writeln!(w, r#"  <data key="d2">{}</data>"#, unit.state())?;
        writeln!(w, r#"</node>"#)?;
    }

    for (i, (src, dst)) in graph.edges().into_iter().enumerate() {
        writeln!(w, r#"<edge id="e{}" source="{}" target="{}"/>"#, i, ids[&src], ids[&dst])?;
    }

    writeln!(w, r#"</graph>"#)?;
    writeln!(w, r#"</graphml>"#)?;
    w.flush()?;
    info!("graphml: wrote -> {}", path.display());
    Ok(())
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::add;

    #[test]
    fn writes_nodes_and_edges() {
        let mut graph = ModuleGraph::default();
        let m = graph.add_module("a&b").expect("module");
        let base = add(&mut graph, m, "Base", &[]);
        let button = add(&mut graph, m, "Button", &[]);
        graph.add_dependency(button, base).expect("edge");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("graph.graphml");
        write_graphml(&path, &graph).expect("write");

        let xml = std::fs::read_to_string(&path).expect("read");
        assert!(xml.contains(r#"<data key="d0">Button</data>"#));
        assert!(xml.contains(r#"<data key="d1">a&amp;b</data>"#));
        assert!(xml.contains(r#"<data key="d2">initialized</data>"#));
        assert!(xml.contains(r#"<edge id="e0" source="n1" target="n0"/>"#));
        assert!(xml.trim_end().ends_with("</graphml>"));
    }
}
