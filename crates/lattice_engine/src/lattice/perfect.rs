//! Perfect lattices: every leaf at the same depth.
//!
//! A perfect lattice of height `h` has `2^(h+1) - 1` nodes, so generation
//! cost doubles with every level. [`HeightGuard`] bounds the height before
//! anything is allocated.

use std::ops::{Deref, DerefMut};

use lattice_core::types::{NodeData, PreconditionError, StructureError};
use tracing::{debug, warn};

use super::address::Address;
use super::binary::BinaryLattice;
use super::node::{LatticeNode, NodeId};

/// Height above which the node count no longer fits comfortably in memory.
pub const HARD_MAX_HEIGHT: u32 = 30;

/// Default generation limit (about 33 million nodes).
pub const DEFAULT_MAX_HEIGHT: u32 = 24;

/// Default height above which generation logs a warning.
pub const DEFAULT_WARN_HEIGHT: u32 = 20;

/// Limits applied by [`PerfectLattice::generate_guarded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightGuard {
    /// Heights above this are rejected.
    pub max: u32,
    /// Heights above this are generated with a warning.
    pub warn: u32,
}

impl Default for HeightGuard {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX_HEIGHT,
            warn: DEFAULT_WARN_HEIGHT,
        }
    }
}

impl HeightGuard {
    /// Guard rejecting heights above `max` (capped at [`HARD_MAX_HEIGHT`]).
    pub fn with_max(max: u32) -> Self {
        let max = max.min(HARD_MAX_HEIGHT);
        Self {
            max,
            warn: DEFAULT_WARN_HEIGHT.min(max),
        }
    }

    /// Checks `height` against the limit and logs above the warning level.
    pub fn check(&self, height: u32) -> Result<(), PreconditionError> {
        let max = self.max.min(HARD_MAX_HEIGHT);
        if height > max {
            return Err(PreconditionError::HeightLimitExceeded { height, max });
        }
        if height > self.warn {
            warn!(
                "Generating perfect lattice of height {} ({} nodes)",
                height,
                perfect_size(height)
            );
        }
        Ok(())
    }
}

/// Node count of a perfect lattice of `height`.
#[inline]
pub fn perfect_size(height: u32) -> usize {
    (1usize << (height + 1)) - 1
}

/// A [`BinaryLattice`] whose leaves all sit at one depth.
///
/// Derefs to the underlying lattice for every read and data operation.
///
/// # Examples
///
/// ```
/// use lattice_engine::lattice::PerfectLattice;
/// use lattice_core::types::{NodeData, Value};
///
/// let lattice = PerfectLattice::generate(3, || {
///     NodeData::from([("price".to_string(), Value::Null)])
/// })
/// .unwrap();
///
/// assert_eq!(lattice.size(), 15);
/// assert_eq!(lattice.height(), 3);
/// assert_eq!(lattice.leaves().count(), 8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PerfectLattice {
    lattice: BinaryLattice,
}

impl PerfectLattice {
    /// Generates a perfect lattice of `height` under the default guard.
    ///
    /// `factory` is called once per node, so nodes may share equal seeds or
    /// receive distinct ones.
    ///
    /// # Errors
    ///
    /// `PreconditionError::HeightLimitExceeded` above [`DEFAULT_MAX_HEIGHT`].
    pub fn generate<F>(height: u32, factory: F) -> Result<Self, PreconditionError>
    where
        F: FnMut() -> NodeData,
    {
        Self::generate_guarded(height, HeightGuard::default(), factory)
    }

    /// Generates with an explicit maximum height.
    pub fn generate_with_limit<F>(
        height: u32,
        max_height: u32,
        factory: F,
    ) -> Result<Self, PreconditionError>
    where
        F: FnMut() -> NodeData,
    {
        Self::generate_guarded(height, HeightGuard::with_max(max_height), factory)
    }

    /// Generates under `guard`, checked before any allocation.
    ///
    /// Nodes are produced bottom-up: the factory sees the deepest level
    /// first and the root last. The arena is laid out in breadth-first
    /// (heap) order, so the children of arena slot `i` are `2i + 1` and
    /// `2i + 2`.
    pub fn generate_guarded<F>(
        height: u32,
        guard: HeightGuard,
        mut factory: F,
    ) -> Result<Self, PreconditionError>
    where
        F: FnMut() -> NodeData,
    {
        guard.check(height)?;

        let size = perfect_size(height);
        let first_leaf = size / 2;

        let mut data: Vec<NodeData> = Vec::with_capacity(size);
        data.resize_with(size, NodeData::new);
        for slot in data.iter_mut().rev() {
            *slot = factory();
        }

        let nodes: Vec<LatticeNode> = data
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                if i < first_leaf {
                    LatticeNode::new(d, Some(NodeId(2 * i + 1)), Some(NodeId(2 * i + 2)))
                } else {
                    LatticeNode::new(d, None, None)
                }
            })
            .collect();
        let addresses = (0..size).map(Address::from_heap_index).collect();

        debug!("Generated perfect lattice: height {}, {} nodes", height, size);
        Ok(Self {
            lattice: BinaryLattice::from_arena_unchecked(nodes, addresses),
        })
    }

    /// Height, recovered from the node count as `bit_length(size + 1) - 2`.
    #[inline]
    pub fn height(&self) -> u32 {
        let n = self.lattice.size() + 1;
        usize::BITS - n.leading_zeros() - 2
    }

    /// Releases the underlying lattice.
    pub fn into_inner(self) -> BinaryLattice {
        self.lattice
    }

    /// The underlying lattice.
    #[inline]
    pub fn as_lattice(&self) -> &BinaryLattice {
        &self.lattice
    }

    /// The underlying lattice, mutably (topology stays frozen).
    #[inline]
    pub fn as_lattice_mut(&mut self) -> &mut BinaryLattice {
        &mut self.lattice
    }
}

impl TryFrom<BinaryLattice> for PerfectLattice {
    type Error = StructureError;

    fn try_from(lattice: BinaryLattice) -> Result<Self, Self::Error> {
        let height = lattice.depth();
        if let Some(leaf) = lattice
            .leaves()
            .find(|id| lattice.address_of(*id).depth() != height)
        {
            return Err(StructureError::NonUniformDepth {
                address: lattice.address_of(leaf).to_string(),
                expected: height,
                found: lattice.address_of(leaf).depth(),
            });
        }
        let size = lattice.size();
        if height >= usize::BITS as usize - 1 || size != (1usize << (height + 1)) - 1 {
            return Err(StructureError::NotPerfect { size });
        }
        Ok(Self { lattice })
    }
}

impl From<PerfectLattice> for BinaryLattice {
    fn from(perfect: PerfectLattice) -> Self {
        perfect.lattice
    }
}

impl Deref for PerfectLattice {
    type Target = BinaryLattice;

    fn deref(&self) -> &Self::Target {
        &self.lattice
    }
}

impl DerefMut for PerfectLattice {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.lattice
    }
}
