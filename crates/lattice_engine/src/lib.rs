//! # lattice_engine: Binary Lattice Topology and Propagation (Layer 2)
//!
//! ## Layer 2 Role
//!
//! lattice_engine builds on `lattice_core` (values, errors, formulas) and
//! provides:
//! - Path-addressed binary lattices with frozen, validated topology
//!   (`lattice::BinaryLattice`)
//! - Perfect lattices generated to a given height under a height guard
//!   (`lattice::PerfectLattice`)
//! - Navigation by `P`/`L`/`R` instruction strings
//! - Compute, backward-induction and forward passes (`propagation`)
//!
//! The engine never interprets node data. Domain layers supply seed values
//! and the per-node [`Formula`](lattice_core::formula::Formula).
//!
//! ## Usage Example
//!
//! Two-step binomial call price by backward induction:
//!
//! ```rust
//! use lattice_core::formula::Formula;
//! use lattice_core::types::{Args, NodeData, Value};
//! use lattice_engine::propagation::{keys, PropagationEngine};
//!
//! let (s0, u, d, strike) = (100.0_f64, 1.1_f64, 0.9_f64, 100.0);
//! let (p, df) = (0.5, 1.0);
//!
//! let engine = PropagationEngine::default();
//! let mut lattice = engine.generate(2, NodeData::new).unwrap();
//!
//! // Seed the leaves with the terminal payoff.
//! for leaf in lattice.leaves().collect::<Vec<_>>() {
//!     let ups = lattice.address_of(leaf).right_moves() as i32;
//!     let spot = s0 * u.powi(ups) * d.powi(2 - ups);
//!     lattice
//!         .data_mut(leaf)
//!         .insert("value".to_string(), Value::from((spot - strike).max(0.0)));
//! }
//!
//! let backward = Formula::new(|args: &Args| {
//!     let down = args.inner_number(keys::LEFT, "value")?;
//!     let up = args.inner_number(keys::RIGHT, "value")?;
//!     let p = args.inner_number(keys::EXTRA, "p")?;
//!     let df = args.inner_number(keys::EXTRA, "df")?;
//!     Ok(Value::from(df * (p * up + (1.0 - p) * down)))
//! });
//! let extra = Value::map([("p", p), ("df", df)]);
//! engine
//!     .propagate_up(&mut lattice, &backward, &extra, "value")
//!     .unwrap();
//!
//! let root = lattice.root();
//! let price = lattice.data(root)["value"].as_number().unwrap();
//! assert!((price - 5.25).abs() < 1e-12);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod lattice;
pub mod propagation;

pub use lattice::{Address, BinaryLattice, NavigationPolicy, NodeId, PerfectLattice, Side};
pub use propagation::{EngineConfig, PropagationEngine, Scope, TraversalMode};
