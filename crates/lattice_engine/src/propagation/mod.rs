//! Propagation passes: compute at nodes, backward induction, forward paths.
//!
//! # Formula calling convention
//!
//! Every pass calls its formula with keyword arguments only. Node data is
//! passed as a [`Value::Map`](lattice_core::types::Value::Map), so a formula
//! built with [`Formula::on_maps`](lattice_core::formula::Formula::on_maps)
//! can pick the fields it needs.
//!
//! | Pass | Keywords |
//! |------|----------|
//! | `compute_at_nodes` | `node`, `extra` |
//! | `propagate_up` | `node`, `left`, `right`, `extra` |
//! | `propagate_down` | `parent`, `node`, `side`, `extra` |
//!
//! # Traversal
//!
//! ```text
//! Sequential      explicit-stack post-order (up) / pre-order (down)
//! LevelParallel   one level at a time, wide levels on the rayon pool,
//!                 barrier between levels
//! ```
//!
//! Both modes produce identical results.

mod config;
mod engine;

pub use config::{
    EngineConfig, EngineConfigBuilder, TraversalMode, DEFAULT_PARALLEL_THRESHOLD, ENV_MAX_HEIGHT,
    ENV_TRAVERSAL,
};
pub use engine::{PropagationEngine, Scope};

/// Keyword argument names used by the passes.
pub mod keys {
    /// Data of the node being computed.
    pub const NODE: &str = "node";
    /// Data of the left child (`Null` when absent).
    pub const LEFT: &str = "left";
    /// Data of the right child (`Null` when absent).
    pub const RIGHT: &str = "right";
    /// Data of the parent.
    pub const PARENT: &str = "parent";
    /// Side of the node under its parent: `"L"` or `"R"`.
    pub const SIDE: &str = "side";
    /// Caller-supplied extra arguments, passed through unchanged.
    pub const EXTRA: &str = "extra";
}
