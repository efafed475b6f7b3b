//! Module graph for elements units.
//!
//! Modules (packages and plugins) own compiled units. Units depend on the
//! units that export the symbols they import; the dependency edges are kept
//! acyclic on every insertion. [`ModuleGraph::resolve_types`] links a unit's
//! import types to exporters and [`ModuleGraph::compile`] produces its code.

pub mod errors;
pub mod export;
pub mod graph;
pub mod registry;
pub mod resolve;
pub mod unit;

pub use errors::{DependencyCycleError, GraphError, Result};
pub use graph::ModuleGraph;
pub use registry::{Module, ModuleId, ModuleRegistry};
pub use resolve::ResolveSummary;
pub use unit::{BoundImport, ModuleUnit, UnitId, UnitState};
