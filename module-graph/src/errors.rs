use crate::registry::ModuleId;
use crate::unit::UnitId;
use thiserror::Error;

/// Edge rejected because it would close a cycle.
///
/// `path` starts and ends with the importing unit, e.g. `a -> b -> c -> a`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .path.join(" -> "))]
pub struct DependencyCycleError {
    pub path: Vec<String>,
}

impl DependencyCycleError {
    /// Units on the cycle, each once.
    pub fn members(&self) -> &[String] {
        match self.path.split_last() {
            Some((_, members)) => members,
            None => &[],
        }
    }
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("module file dependency cycle found: {0}")]
    DependencyCycle(#[from] DependencyCycleError),

    #[error("unknown unit: {0:?}")]
    UnknownUnit(UnitId),

    #[error("unknown module: {0:?}")]
    UnknownModule(ModuleId),

    #[error("module already registered: {0}")]
    DuplicateModule(String),

    #[error(transparent)]
    Compile(#[from] elements_compiler::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
