pub mod arena;
pub mod ast;
pub mod module;
pub mod span;
