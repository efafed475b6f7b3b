//! Debugging aids.

pub mod debug_ast;
