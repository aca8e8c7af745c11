//! Core IR for the expression engine: the expression tree, host values, member handles
//! and the tree passes shared by the interpreter and the expander.

#[macro_use]
pub mod macros;

pub mod ast;
pub mod collections;
pub mod error;
pub mod holder;
pub mod ops;
pub mod passes;
pub mod pretty;
pub mod visit;

// Re-export commonly used items for convenience
pub use tracing;

// Alias for error types
pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
