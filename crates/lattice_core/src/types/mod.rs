//! Node values, call arguments and error types.
//!
//! This module provides:
//! - `value`: The [`Value`] held in node data maps and passed to formulas
//! - `args`: Positional/keyword call arguments ([`Args`])
//! - `error`: Structured error types for every failure class of the engine
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level.

pub mod args;
pub mod error;
pub mod value;

pub use args::Args;
pub use error::{
    AdapterError, ConfigError, FormulaError, LatticeError, LookupError, NavigationError,
    PreconditionError, StructureError,
};
pub use value::{NodeData, Value};
