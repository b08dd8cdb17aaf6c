//! Node types: arena nodes and construction inputs.

use lattice_core::types::NodeData;

use super::address::Side;

/// Handle of a node inside the [`BinaryLattice`](super::BinaryLattice) that
/// issued it. Ids are not meaningful across lattices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena index of the node.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in the lattice arena: mutable data plus child slots.
///
/// The node stores neither its parent nor its address; both are derived
/// from the lattice's address index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatticeNode {
    pub(crate) data: NodeData,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl LatticeNode {
    pub(crate) fn new(data: NodeData, left: Option<NodeId>, right: Option<NodeId>) -> Self {
        Self { data, left, right }
    }

    /// Node data.
    #[inline]
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Left child, if any.
    #[inline]
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Right child, if any.
    #[inline]
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Child on `side`, if any.
    #[inline]
    pub fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Whether the node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub(crate) fn set_child(&mut self, side: Side, child: NodeId) {
        match side {
            Side::Left => self.left = Some(child),
            Side::Right => self.right = Some(child),
        }
    }
}

/// Recursively linked construction input: a root owning its subtrees.
///
/// # Examples
///
/// ```
/// use lattice_engine::lattice::TreeNode;
/// use lattice_core::types::NodeData;
///
/// let root = TreeNode::new(
///     NodeData::new(),
///     Some(TreeNode::leaf(NodeData::new())),
///     Some(TreeNode::leaf(NodeData::new())),
/// );
/// assert_eq!(root.count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeNode {
    /// Node data.
    pub data: NodeData,
    /// Left subtree.
    pub left: Option<Box<TreeNode>>,
    /// Right subtree.
    pub right: Option<Box<TreeNode>>,
}

impl TreeNode {
    /// Node with the given subtrees.
    pub fn new(data: NodeData, left: Option<TreeNode>, right: Option<TreeNode>) -> Self {
        Self {
            data,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    /// Node without children.
    pub fn leaf(data: NodeData) -> Self {
        Self::new(data, None, None)
    }

    /// Number of nodes in this subtree.
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.left.as_deref());
            stack.extend(node.right.as_deref());
        }
        count
    }
}

/// Flat-list construction input: children are indices into the same list.
///
/// Exactly one node of the list must be parentless.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LooseNode {
    /// Node data.
    pub data: NodeData,
    /// List index of the left child.
    pub left: Option<usize>,
    /// List index of the right child.
    pub right: Option<usize>,
}

impl LooseNode {
    /// Node with the given child indices.
    pub fn new(data: NodeData, left: Option<usize>, right: Option<usize>) -> Self {
        Self { data, left, right }
    }

    /// Node without children.
    pub fn leaf(data: NodeData) -> Self {
        Self::new(data, None, None)
    }
}
