//! Formulas and argument adaptation.
//!
//! ## Module Structure
//!
//! - `adapter`: [`ArgumentAdapter`] spec table, options and validation
//! - `function`: [`Formula`], a pure computation optionally preceded by an adapter
//!
//! A formula is evaluated at every node of a lattice with different
//! neighbour inputs. The adapter lets one domain function, written against
//! a flat argument list, read those inputs out of node data maps.
//!
//! ```rust
//! use lattice_core::formula::{Formula, OutputSlot, SourceRule};
//! use lattice_core::types::{Args, Value};
//!
//! // value = parent + bump
//! let step = Formula::on_maps(
//!     |args: &Args| Ok(Value::from(args.number_at(0)? + args.number_at(1)?)),
//!     vec![
//!         (OutputSlot::from(0), SourceRule::keyword("parent").inner("price")),
//!         (OutputSlot::from(1), SourceRule::keyword("extra").inner("bump")),
//!     ],
//! )
//! .unwrap();
//!
//! let args = Args::new()
//!     .with_keyword("parent", Value::map([("price", 100.0)]))
//!     .with_keyword("extra", Value::map([("bump", 10.0)]));
//! assert_eq!(step.call(&args).unwrap(), Value::Number(110.0));
//! ```

mod adapter;
mod function;

pub use adapter::{
    AdapterOptions, AdapterSpec, ArgumentAdapter, OutputSlot, SourceKind, SourceRef, SourceRule,
    MAX_OUTPUT_POSITION,
};
pub use function::{AdapterSource, Formula, FormulaFn};
