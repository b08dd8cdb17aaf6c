//! Lattice construction from root-node, node-list or address-map inputs.
//!
//! Every input is normalised to the canonical address map before the arena
//! is built. When several inputs are given they must describe the same
//! lattice, data included.

use std::collections::BTreeMap;

use lattice_core::types::{NodeData, StructureError};
use tracing::debug;

use super::address::{Address, Side};
use super::binary::BinaryLattice;
use super::node::{LooseNode, TreeNode};

type AddressMap = BTreeMap<Address, NodeData>;

/// Builder for [`BinaryLattice`].
///
/// Validation is on by default. [`skip_validation`](Self::skip_validation)
/// skips the edge-count check and the agreement check between inputs (the
/// first given input wins); checks without which no arena can be built
/// (a single root, resolvable children, prefix closure) always run.
///
/// # Examples
///
/// ```
/// use lattice_engine::lattice::{BinaryLattice, LooseNode, TreeNode};
/// use lattice_core::types::NodeData;
///
/// let tree = TreeNode::new(NodeData::new(), Some(TreeNode::leaf(NodeData::new())), None);
/// let list = vec![
///     LooseNode::leaf(NodeData::new()),
///     LooseNode::new(NodeData::new(), Some(0), None),
/// ];
///
/// // Both describe a root with a single left child.
/// let lattice = BinaryLattice::builder().root(tree).nodes(list).build().unwrap();
/// assert_eq!(lattice.size(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct LatticeBuilder {
    root: Option<TreeNode>,
    nodes: Option<Vec<LooseNode>>,
    addresses: Option<AddressMap>,
    validate: bool,
}

impl Default for LatticeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LatticeBuilder {
    /// Creates an empty builder with validation enabled.
    pub fn new() -> Self {
        Self {
            root: None,
            nodes: None,
            addresses: None,
            validate: true,
        }
    }

    /// Sets the root-node input.
    pub fn root(mut self, root: TreeNode) -> Self {
        self.root = Some(root);
        self
    }

    /// Sets the flat node-list input.
    pub fn nodes(mut self, nodes: Vec<LooseNode>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Sets the address-map input.
    pub fn addresses(mut self, addresses: AddressMap) -> Self {
        self.addresses = Some(addresses);
        self
    }

    /// Skips the checks that are not needed to build the arena.
    pub fn skip_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Normalises the inputs and builds the lattice.
    ///
    /// # Errors
    ///
    /// - `EmptySource` if no input was given
    /// - `DisagreeingInputs` if two inputs normalise differently
    /// - any structural violation found while normalising or linking
    pub fn build(self) -> Result<BinaryLattice, StructureError> {
        let mut forms: Vec<(&'static str, AddressMap)> = Vec::with_capacity(3);
        if let Some(root) = self.root {
            forms.push(("root node", tree_to_map(root)));
        }
        if let Some(nodes) = self.nodes {
            forms.push(("node list", loose_to_map(nodes, self.validate)?));
        }
        if let Some(addresses) = self.addresses {
            forms.push(("address map", addresses));
        }

        let mut forms = forms.into_iter();
        let (first_name, canonical) = forms.next().ok_or(StructureError::EmptySource)?;
        if self.validate {
            for (name, other) in forms {
                if let Some(address) = first_difference(&canonical, &other) {
                    return Err(StructureError::DisagreeingInputs(format!(
                        "{} and {} differ at '{}'",
                        first_name, name, address
                    )));
                }
            }
        }

        let lattice = BinaryLattice::from_canonical(canonical, self.validate)?;
        debug!(
            "Built lattice from {}: {} nodes, depth {}",
            first_name,
            lattice.size(),
            lattice.depth()
        );
        Ok(lattice)
    }
}

/// Flattens a recursively linked tree into an address map.
fn tree_to_map(root: TreeNode) -> AddressMap {
    let mut map = AddressMap::new();
    let mut stack = vec![(Address::root(), root)];
    while let Some((address, node)) = stack.pop() {
        let TreeNode { data, left, right } = node;
        if let Some(left) = left {
            stack.push((address.child(Side::Left), *left));
        }
        if let Some(right) = right {
            stack.push((address.child(Side::Right), *right));
        }
        map.insert(address, data);
    }
    map
}

/// Resolves a flat node list into an address map.
fn loose_to_map(nodes: Vec<LooseNode>, validate: bool) -> Result<AddressMap, StructureError> {
    let n = nodes.len();
    let mut parent_count = vec![0usize; n];
    let mut edges = 0usize;

    for (index, node) in nodes.iter().enumerate() {
        for child in [node.left, node.right].into_iter().flatten() {
            if child >= n {
                return Err(StructureError::DanglingChild { index, child });
            }
            parent_count[child] += 1;
            edges += 1;
        }
    }

    let roots: Vec<usize> = (0..n).filter(|i| parent_count[*i] == 0).collect();
    let root = match roots.as_slice() {
        [] => return Err(StructureError::NoRoot),
        [root] => *root,
        _ => return Err(StructureError::MultipleRoots { count: roots.len() }),
    };
    if let Some(child) = (0..n).find(|i| parent_count[*i] > 1) {
        return Err(StructureError::DuplicateChild { child });
    }
    if validate && edges + 1 != n {
        return Err(StructureError::EdgeCountMismatch { edges, nodes: n });
    }

    let mut slots: Vec<Option<LooseNode>> = nodes.into_iter().map(Some).collect();
    let mut map = AddressMap::new();
    let mut stack = vec![(Address::root(), root)];

    while let Some((address, i)) = stack.pop() {
        let Some(node) = slots[i].take() else {
            return Err(StructureError::DuplicateChild { child: i });
        };
        if let Some(left) = node.left {
            stack.push((address.child(Side::Left), left));
        }
        if let Some(right) = node.right {
            stack.push((address.child(Side::Right), right));
        }
        map.insert(address, node.data);
    }

    // Nodes on a cycle detached from the root each have one parent and
    // survive the counts above; they show up here as unreached.
    if map.len() != n {
        return Err(StructureError::UnreachableNodes {
            count: n - map.len(),
        });
    }
    Ok(map)
}

/// First address (in address order) where two maps differ.
fn first_difference(a: &AddressMap, b: &AddressMap) -> Option<Address> {
    a.keys()
        .chain(b.keys())
        .filter(|k| a.get(*k) != b.get(*k))
        .min()
        .cloned()
}
