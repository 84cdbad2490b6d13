//! Runtime core of a Lox tree-walking interpreter: lexically chained scopes,
//! functions and closures, classes, instances and bound methods.
//!
//! Lexing and parsing live elsewhere. Callers hand over a [`ast::Program`] (or single
//! statements and expressions) and get back [`Value`]s or a [`RuntimeError`].

pub mod ast;
pub mod config;
pub mod interpreter;
mod stack;
pub mod token;

pub use config::Config;
pub use interpreter::{configured_interpreter, stock_interpreter, Interpreter, RuntimeError, Value};
