//! Lattice topology: addresses, arena storage, construction and navigation.
//!
//! # Architecture
//!
//! ```text
//! BinaryLattice
//! ├── nodes      Vec<LatticeNode>   data + child ids
//! ├── addresses  Vec<Address>       path of each node
//! ├── index      Address -> NodeId  single source of parentage
//! └── levels     NodeId by depth
//!
//! PerfectLattice  BinaryLattice with all leaves at one depth
//! ```
//!
//! Topology is frozen at construction. Construction inputs ([`TreeNode`],
//! [`LooseNode`], address maps) are all normalised to the canonical address
//! map first.

mod address;
mod binary;
mod builder;
mod navigate;
mod node;
mod perfect;

pub use address::{Address, Side};
pub use binary::BinaryLattice;
pub use builder::LatticeBuilder;
pub use navigate::{Instruction, NavigationPolicy, Strictness};
pub use node::{LatticeNode, LooseNode, NodeId, TreeNode};
pub use perfect::{
    perfect_size, HeightGuard, PerfectLattice, DEFAULT_MAX_HEIGHT, DEFAULT_WARN_HEIGHT,
    HARD_MAX_HEIGHT,
};
