//! Compiler for the elements component language.
//!
//! Pipeline per unit: CST ([`cst`]) → AST ([`builder`]) → scope and binding
//! analysis ([`scope`]) → text edits over the source ([`codegen`]).
//! [`SourceUnit`] bundles the pipeline with the `exports`/`imports` queries
//! module loaders need.

pub mod builder;
pub mod codegen;
pub mod config;
pub mod core;
pub mod cst;
pub mod errors;
pub mod model;
pub mod scope;
pub mod unit;

pub use builder::build_ast;
pub use codegen::{Edit, Generator, apply_edits};
pub use config::model::{CodegenConfig, CompilerConfig, ModuleConfig, ScopeConfig};
pub use cst::CstNode;
pub use cst::owned::OwnedCst;
pub use errors::{Error, Result, SyntaxError};
pub use model::arena::Ast;
pub use model::module::{ExportEntry, ExportKind, ImportEntry};
pub use scope::import_types::{ImportType, ImportTypeTable};
pub use unit::SourceUnit;

use std::sync::Arc;

/// Compiles one self-contained unit. External symbols stay unresolved and are
/// imported from the configured sentinel path.
pub fn compile<N: CstNode>(source: &str, root: N, unit_name: &str, config: &CompilerConfig) -> Result<String> {
    SourceUnit::build(unit_name, source, root, Arc::new(config.clone()))?.to_js()
}
