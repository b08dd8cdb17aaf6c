//! The binary lattice container.
//!
//! Storage is an arena: `nodes[i]` holds data and child ids, `addresses[i]`
//! its path, and `index` maps each path back to its id. The address index
//! is the single source of truth for parentage.

use std::collections::{BTreeMap, HashMap};

use lattice_core::types::{LookupError, NodeData, StructureError, Value};

use super::address::{Address, Side};
use super::builder::LatticeBuilder;
use super::node::{LatticeNode, LooseNode, NodeId, TreeNode};

/// A binary tree of mutable node data with frozen topology.
///
/// Topology is fixed at construction; only node data changes afterwards,
/// through `data_mut`, `reset_all` or a propagation pass.
///
/// # Examples
///
/// ```
/// use lattice_engine::lattice::{Address, BinaryLattice};
/// use lattice_core::types::NodeData;
/// use std::collections::BTreeMap;
///
/// let mut map = BTreeMap::new();
/// for a in ["", "L", "R", "RL"] {
///     map.insert(a.parse::<Address>().unwrap(), NodeData::new());
/// }
/// let lattice = BinaryLattice::from_addresses(map).unwrap();
///
/// assert_eq!(lattice.size(), 4);
/// assert_eq!(lattice.edge_count(), 3);
/// let rl = lattice.node_at(&"RL".parse().unwrap()).unwrap();
/// let r = lattice.parent_of(rl).unwrap();
/// assert_eq!(lattice.address_of(r).as_str(), "R");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryLattice {
    nodes: Vec<LatticeNode>,
    addresses: Vec<Address>,
    index: HashMap<Address, NodeId>,
    levels: Vec<Vec<NodeId>>,
}

impl BinaryLattice {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Starts a builder accepting any combination of construction inputs.
    #[inline]
    pub fn builder() -> LatticeBuilder {
        LatticeBuilder::new()
    }

    /// Builds from a root node with recursively linked children.
    pub fn from_root(root: TreeNode) -> Result<Self, StructureError> {
        LatticeBuilder::new().root(root).build()
    }

    /// Builds from a flat node list (children referenced by list index).
    pub fn from_nodes(nodes: Vec<LooseNode>) -> Result<Self, StructureError> {
        LatticeBuilder::new().nodes(nodes).build()
    }

    /// Builds from an address map.
    pub fn from_addresses(map: BTreeMap<Address, NodeData>) -> Result<Self, StructureError> {
        LatticeBuilder::new().addresses(map).build()
    }

    /// Builds the arena from the canonical address map.
    ///
    /// Root presence and prefix closure are always enforced since the arena
    /// cannot link an orphan. With `validate`, the edge count is checked too.
    pub(crate) fn from_canonical(
        map: BTreeMap<Address, NodeData>,
        validate: bool,
    ) -> Result<Self, StructureError> {
        if !map.contains_key(&Address::root()) {
            return Err(StructureError::NoRoot);
        }

        let size = map.len();
        let mut nodes: Vec<LatticeNode> = Vec::with_capacity(size);
        let mut addresses = Vec::with_capacity(size);
        let mut index: HashMap<Address, NodeId> = HashMap::with_capacity(size);

        // BTreeMap order is pre-order, so a parent always precedes its children.
        for (i, (address, data)) in map.into_iter().enumerate() {
            let id = NodeId(i);
            if let (Some(parent), Some(side)) = (address.parent(), address.last_side()) {
                let parent_id = *index.get(&parent).ok_or_else(|| StructureError::OrphanAddress {
                    address: address.to_string(),
                })?;
                let parent_node: &mut LatticeNode = &mut nodes[parent_id.0];
                parent_node.set_child(side, id);
            }
            nodes.push(LatticeNode::new(data, None, None));
            index.insert(address.clone(), id);
            addresses.push(address);
        }

        let lattice = Self::assemble(nodes, addresses, index);
        if validate {
            lattice.check_edge_count()?;
        }
        Ok(lattice)
    }

    /// Assembles a lattice from an arena that is correct by construction.
    pub(crate) fn from_arena_unchecked(nodes: Vec<LatticeNode>, addresses: Vec<Address>) -> Self {
        let index = addresses
            .iter()
            .enumerate()
            .map(|(i, a)| (a.clone(), NodeId(i)))
            .collect();
        Self::assemble(nodes, addresses, index)
    }

    fn assemble(
        nodes: Vec<LatticeNode>,
        addresses: Vec<Address>,
        index: HashMap<Address, NodeId>,
    ) -> Self {
        let depth = addresses.iter().map(Address::depth).max().unwrap_or(0);
        let mut levels = vec![Vec::new(); depth + 1];
        for (i, address) in addresses.iter().enumerate() {
            levels[address.depth()].push(NodeId(i));
        }
        Self {
            nodes,
            addresses,
            index,
            levels,
        }
    }

    fn check_edge_count(&self) -> Result<(), StructureError> {
        let edges = self.edge_count();
        let nodes = self.size();
        if edges + 1 != nodes {
            return Err(StructureError::EdgeCountMismatch { edges, nodes });
        }
        Ok(())
    }

    // =========================================================================
    // Topology queries
    // =========================================================================

    /// The root node.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.index[&Address::root()]
    }

    /// Number of nodes.
    #[inline]
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Number of parent-to-child edges (`size() - 1` for any valid lattice).
    pub fn edge_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| usize::from(n.left.is_some()) + usize::from(n.right.is_some()))
            .sum()
    }

    /// Largest node depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Node ids grouped by depth, root level first.
    #[inline]
    pub fn levels(&self) -> &[Vec<NodeId>] {
        &self.levels
    }

    /// Node at `address`.
    ///
    /// # Errors
    ///
    /// `LookupError::UnknownAddress` if no node has that address.
    pub fn node_at(&self, address: &Address) -> Result<NodeId, LookupError> {
        self.index
            .get(address)
            .copied()
            .ok_or_else(|| LookupError::UnknownAddress {
                address: address.to_string(),
            })
    }

    /// Node at `address`, if any.
    #[inline]
    pub fn id_at(&self, address: &Address) -> Option<NodeId> {
        self.index.get(address).copied()
    }

    /// Arena node for `id`.
    ///
    /// # Panics
    ///
    /// If `id` was not issued by this lattice.
    #[inline]
    pub fn node(&self, id: NodeId) -> &LatticeNode {
        &self.nodes[id.0]
    }

    /// Address of `id`.
    #[inline]
    pub fn address_of(&self, id: NodeId) -> &Address {
        &self.addresses[id.0]
    }

    /// Parent of `id`, `None` for the root.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.addresses[id.0]
            .parent()
            .and_then(|parent| self.index.get(&parent).copied())
    }

    /// Ordered `(left, right)` children of `id`.
    #[inline]
    pub fn children_of(&self, id: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        let node = &self.nodes[id.0];
        (node.left, node.right)
    }

    /// Child of `id` on `side`.
    #[inline]
    pub fn child_of(&self, id: NodeId, side: Side) -> Option<NodeId> {
        self.nodes[id.0].child(side)
    }

    /// Whether `id` has no children.
    #[inline]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_leaf()
    }

    /// All node ids, in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Nodes with their data in pre-order (root, left subtree, right subtree),
    /// which is also address order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeData)> + '_ {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            let (left, right) = self.children_of(id);
            stack.extend(right);
            stack.extend(left);
        }
        order.into_iter().map(move |id| (id, self.data(id)))
    }

    /// Leaf ids, in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().filter(move |id| self.is_leaf(*id))
    }

    // =========================================================================
    // Node data
    // =========================================================================

    /// Data of `id`.
    #[inline]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Mutable data of `id`.
    #[inline]
    pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0].data
    }

    /// Value stored at `key` in the node at `address`.
    pub fn value_at(&self, address: &Address, key: &str) -> Result<&Value, LookupError> {
        let id = self.node_at(address)?;
        self.data(id)
            .get(key)
            .ok_or_else(|| LookupError::MissingInnerKey {
                argument: format!("node '{}'", address),
                key: key.to_string(),
            })
    }

    /// Overwrites every node's data with a fresh copy of `value`.
    pub fn reset_all(&mut self, value: &NodeData) {
        for node in &mut self.nodes {
            node.data = value.clone();
        }
    }

    /// Gives every node a map holding `keys`, each set to `Value::Null`.
    pub fn reset_all_to_keys<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let template: NodeData = keys.into_iter().map(|k| (k.into(), Value::Null)).collect();
        self.reset_all(&template);
    }

    /// Gives every node an empty map.
    pub fn reset_all_empty(&mut self) {
        self.reset_all(&NodeData::new());
    }

    /// Snapshot of the lattice as an address map (address order).
    pub fn to_address_map(&self) -> BTreeMap<Address, NodeData> {
        self.addresses
            .iter()
            .cloned()
            .zip(self.nodes.iter().map(|n| n.data.clone()))
            .collect()
    }
}
