//! # lattice_core: Values, Errors and Formulas for the Lattice Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! lattice_core is the bottom layer of the workspace, providing:
//! - Node values and call arguments (`types::value`, `types::args`)
//! - Error types for every failure class (`types::error`)
//! - Declarative argument adaptation (`formula::ArgumentAdapter`)
//! - Pure computations reused at every lattice node (`formula::Formula`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependency on the lattice topology. It knows nothing about
//! trees, addresses or traversal order; `lattice_engine` builds on it.
//!
//! ## Usage Examples
//!
//! ```rust
//! use lattice_core::formula::{Formula, OutputSlot, SourceRule};
//! use lattice_core::types::{Args, Value};
//!
//! // Discounted expectation over two children's values
//! let backward = Formula::on_maps(
//!     |args: &Args| {
//!         let (down, up) = (args.number_at(0)?, args.number_at(1)?);
//!         let (p, df) = (args.number("p")?, args.number("df")?);
//!         Ok(Value::from(df * (p * up + (1.0 - p) * down)))
//!     },
//!     vec![
//!         (OutputSlot::from(0), SourceRule::keyword("left").inner("value")),
//!         (OutputSlot::from(1), SourceRule::keyword("right").inner("value")),
//!         (OutputSlot::from("p"), SourceRule::keyword("extra").inner("p")),
//!         (OutputSlot::from("df"), SourceRule::keyword("extra").inner("df")),
//!     ],
//! )
//! .unwrap();
//!
//! let args = Args::new()
//!     .with_keyword("left", Value::map([("value", 0.0)]))
//!     .with_keyword("right", Value::map([("value", 10.0)]))
//!     .with_keyword("extra", Value::map([("p", 0.5), ("df", 1.0)]));
//! assert_eq!(backward.call(&args).unwrap(), Value::Number(5.0));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod formula;
pub mod types;
