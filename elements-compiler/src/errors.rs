use thiserror::Error;

/// Location of the first error-marker node the grammar engine produced.
///
/// `line` and `column` are 0-based, exactly as reported by the CST start point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error in '{unit_name}' at {line}:{column} (byte {byte_offset})")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
    pub unit_name: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("overlapping edits: [{}, {}) and [{}, {})", .first.start, .first.end, .second.start, .second.end)]
    OverlappingEdits {
        first: std::ops::Range<usize>,
        second: std::ops::Range<usize>,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("serde yaml error: {0}")]
    SerdeYaml(#[from] serde_yml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
