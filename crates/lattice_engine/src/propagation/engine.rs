//! Propagation passes over a lattice.

use lattice_core::formula::Formula;
use lattice_core::types::{Args, LatticeError, NodeData, PreconditionError, Value};
use rayon::prelude::*;
use tracing::{debug, trace};

use super::config::{EngineConfig, TraversalMode};
use super::keys;
use crate::lattice::{BinaryLattice, NodeId, PerfectLattice, Side};

/// Which nodes a [`PropagationEngine::compute_at_nodes`] pass visits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every node.
    #[default]
    All,
    /// The root only.
    RootOnly,
    /// Leaves only.
    LeavesOnly,
}

/// Drives compute, backward-induction and forward passes.
///
/// The engine holds only its configuration. Each call is one complete pass
/// that borrows the lattice exclusively, so two passes can never write the
/// same lattice at once. A formula failure aborts the pass; nodes already
/// written keep their new values.
///
/// # Examples
///
/// ```
/// use lattice_core::formula::Formula;
/// use lattice_core::types::{Args, NodeData, Value};
/// use lattice_engine::propagation::PropagationEngine;
///
/// let engine = PropagationEngine::default();
/// let mut lattice = engine.generate(2, NodeData::new).unwrap();
///
/// let root = lattice.root();
/// lattice.data_mut(root).insert("price".to_string(), Value::from(100.0));
///
/// // Each step adds 10 on the right and subtracts 10 on the left.
/// let step = Formula::new(|args: &Args| {
///     let parent = args.inner_number("parent", "price")?;
///     let up = args.keyword("side")?.as_text() == Some("R");
///     Ok(Value::from(if up { parent + 10.0 } else { parent - 10.0 }))
/// });
/// engine
///     .propagate_down(&mut lattice, &step, &Value::Null, "price")
///     .unwrap();
///
/// let rr = lattice.node_at(&"RR".parse().unwrap()).unwrap();
/// assert_eq!(lattice.data(rr)["price"], Value::Number(120.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationEngine {
    config: EngineConfig,
}

impl PropagationEngine {
    /// Creates an engine with `config`.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine configuration.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generates a perfect lattice under the configured height guard.
    ///
    /// # Errors
    ///
    /// `PreconditionError::HeightLimitExceeded` above `max_height`.
    pub fn generate<F>(&self, height: u32, factory: F) -> Result<PerfectLattice, PreconditionError>
    where
        F: FnMut() -> NodeData,
    {
        PerfectLattice::generate_guarded(height, self.config.height_guard(), factory)
    }

    // =========================================================================
    // Compute at nodes
    // =========================================================================

    /// Writes `formula(node, extra)` into `output_key` of every node in `scope`.
    ///
    /// Nodes are independent: all results are computed before any is written,
    /// so a failing formula leaves the lattice untouched.
    ///
    /// Formula keywords: `node`, `extra`.
    ///
    /// # Returns
    ///
    /// Number of nodes written.
    pub fn compute_at_nodes(
        &self,
        lattice: &mut BinaryLattice,
        formula: &Formula,
        extra: &Value,
        scope: Scope,
        output_key: &str,
    ) -> Result<usize, LatticeError> {
        let targets: Vec<NodeId> = match scope {
            Scope::All => lattice.ids().collect(),
            Scope::RootOnly => vec![lattice.root()],
            Scope::LeavesOnly => lattice.leaves().collect(),
        };

        let view: &BinaryLattice = lattice;
        let results = self.evaluate_batch(&targets, |&id| {
            let args = Args::new()
                .with_keyword(keys::NODE, view.data(id).clone())
                .with_keyword(keys::EXTRA, extra.clone());
            call(view, id, formula, &args)
        })?;

        let written = write_results(lattice, results, output_key);
        debug!(
            "compute_at_nodes ({:?}): {} nodes written to '{}'",
            scope, written, output_key
        );
        Ok(written)
    }

    // =========================================================================
    // Backward induction
    // =========================================================================

    /// Folds values from the leaves to the root.
    ///
    /// Every internal node receives `formula(node, left, right, extra)` at
    /// `output_key`, after both of its children. A missing child (only
    /// possible in a non-perfect lattice) is passed as `Null`.
    ///
    /// # Errors
    ///
    /// - `PreconditionError::MissingLeafSeed` if a leaf lacks `output_key`,
    ///   reported before anything is computed
    /// - `LatticeError::Formula` naming the node whose formula failed
    ///
    /// # Returns
    ///
    /// Number of internal nodes written.
    pub fn propagate_up(
        &self,
        lattice: &mut BinaryLattice,
        formula: &Formula,
        extra: &Value,
        output_key: &str,
    ) -> Result<usize, LatticeError> {
        if let Some(leaf) = lattice
            .leaves()
            .find(|id| !lattice.data(*id).contains_key(output_key))
        {
            return Err(PreconditionError::MissingLeafSeed {
                address: lattice.address_of(leaf).to_string(),
                key: output_key.to_string(),
            }
            .into());
        }

        let written = match self.config.traversal() {
            TraversalMode::Sequential => up_post_order(lattice, formula, extra, output_key)?,
            TraversalMode::LevelParallel => self.up_by_level(lattice, formula, extra, output_key)?,
        };
        debug!(
            "propagate_up: {} internal nodes written to '{}'",
            written, output_key
        );
        Ok(written)
    }

    fn up_by_level(
        &self,
        lattice: &mut BinaryLattice,
        formula: &Formula,
        extra: &Value,
        output_key: &str,
    ) -> Result<usize, LatticeError> {
        let mut written = 0;
        for depth in (0..lattice.levels().len()).rev() {
            let internal: Vec<NodeId> = lattice.levels()[depth]
                .iter()
                .copied()
                .filter(|id| !lattice.is_leaf(*id))
                .collect();
            if internal.is_empty() {
                continue;
            }
            let view: &BinaryLattice = lattice;
            let results = self.evaluate_batch(&internal, |&id| {
                call(view, id, formula, &up_args(view, id, extra))
            })?;
            written += write_results(lattice, results, output_key);
        }
        Ok(written)
    }

    // =========================================================================
    // Forward propagation
    // =========================================================================

    /// Pushes values from the root to the leaves.
    ///
    /// Every non-root node receives `formula(parent, node, side, extra)` at
    /// `output_key`, after its parent. `side` is `Text("L")` or `Text("R")`.
    ///
    /// # Errors
    ///
    /// - `PreconditionError::MissingRootSeed` if the root lacks `output_key`
    /// - `LatticeError::Formula` naming the node whose formula failed
    ///
    /// # Returns
    ///
    /// Number of non-root nodes written.
    pub fn propagate_down(
        &self,
        lattice: &mut BinaryLattice,
        formula: &Formula,
        extra: &Value,
        output_key: &str,
    ) -> Result<usize, LatticeError> {
        if !lattice.data(lattice.root()).contains_key(output_key) {
            return Err(PreconditionError::MissingRootSeed {
                key: output_key.to_string(),
            }
            .into());
        }

        let written = match self.config.traversal() {
            TraversalMode::Sequential => down_pre_order(lattice, formula, extra, output_key)?,
            TraversalMode::LevelParallel => {
                self.down_by_level(lattice, formula, extra, output_key)?
            }
        };
        debug!(
            "propagate_down: {} nodes written to '{}'",
            written, output_key
        );
        Ok(written)
    }

    fn down_by_level(
        &self,
        lattice: &mut BinaryLattice,
        formula: &Formula,
        extra: &Value,
        output_key: &str,
    ) -> Result<usize, LatticeError> {
        let mut written = 0;
        for depth in 1..lattice.levels().len() {
            // (child, parent, side) for every node of this level
            let edges: Vec<(NodeId, NodeId, Side)> = lattice.levels()[depth - 1]
                .iter()
                .flat_map(|&parent| {
                    let (left, right) = lattice.children_of(parent);
                    [
                        left.map(|c| (c, parent, Side::Left)),
                        right.map(|c| (c, parent, Side::Right)),
                    ]
                })
                .flatten()
                .collect();
            let view: &BinaryLattice = lattice;
            let results = self.evaluate_batch(&edges, |&(child, parent, side)| {
                call(view, child, formula, &down_args(view, child, parent, side, extra))
            })?;
            written += write_results(lattice, results, output_key);
        }
        Ok(written)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Evaluates every item, in parallel when the batch is wide enough.
    /// The first element of an item is the node the result belongs to;
    /// results keep the order of `items`.
    fn evaluate_batch<T, F>(&self, items: &[T], eval: F) -> Result<Vec<(NodeId, Value)>, LatticeError>
    where
        T: Target + Sync,
        F: Fn(&T) -> Result<Value, LatticeError> + Sync + Send,
    {
        if self.config.should_parallelize(items.len()) {
            items
                .par_iter()
                .map(|item| eval(item).map(|v| (item.node(), v)))
                .collect()
        } else {
            items
                .iter()
                .map(|item| eval(item).map(|v| (item.node(), v)))
                .collect()
        }
    }
}

/// Batch item naming the node a result is written to.
trait Target {
    fn node(&self) -> NodeId;
}

impl Target for NodeId {
    fn node(&self) -> NodeId {
        *self
    }
}

impl Target for (NodeId, NodeId, Side) {
    fn node(&self) -> NodeId {
        self.0
    }
}

/// Strict post-order walk with an explicit stack.
fn up_post_order(
    lattice: &mut BinaryLattice,
    formula: &Formula,
    extra: &Value,
    output_key: &str,
) -> Result<usize, LatticeError> {
    let mut written = 0;
    // (node, children already pushed)
    let mut stack: Vec<(NodeId, bool)> = vec![(lattice.root(), false)];

    while let Some((id, expanded)) = stack.pop() {
        if lattice.is_leaf(id) {
            continue;
        }
        if !expanded {
            stack.push((id, true));
            let (left, right) = lattice.children_of(id);
            stack.extend(right.map(|r| (r, false)));
            stack.extend(left.map(|l| (l, false)));
            continue;
        }
        let value = call(lattice, id, formula, &up_args(lattice, id, extra))?;
        lattice.data_mut(id).insert(output_key.to_string(), value);
        written += 1;
    }
    Ok(written)
}

/// Pre-order walk with an explicit stack; left subtrees first.
fn down_pre_order(
    lattice: &mut BinaryLattice,
    formula: &Formula,
    extra: &Value,
    output_key: &str,
) -> Result<usize, LatticeError> {
    let mut written = 0;
    let mut stack = vec![lattice.root()];

    while let Some(id) = stack.pop() {
        let (left, right) = lattice.children_of(id);
        let children = [left.map(|c| (c, Side::Left)), right.map(|c| (c, Side::Right))];
        for (child, side) in children.into_iter().flatten() {
            let args = down_args(lattice, child, id, side, extra);
            let value = call(lattice, child, formula, &args)?;
            lattice.data_mut(child).insert(output_key.to_string(), value);
            written += 1;
        }
        stack.extend(right);
        stack.extend(left);
    }
    Ok(written)
}

fn up_args(lattice: &BinaryLattice, id: NodeId, extra: &Value) -> Args {
    let child = |side| {
        lattice
            .child_of(id, side)
            .map_or(Value::Null, |c| Value::Map(lattice.data(c).clone()))
    };
    Args::new()
        .with_keyword(keys::NODE, lattice.data(id).clone())
        .with_keyword(keys::LEFT, child(Side::Left))
        .with_keyword(keys::RIGHT, child(Side::Right))
        .with_keyword(keys::EXTRA, extra.clone())
}

fn down_args(lattice: &BinaryLattice, id: NodeId, parent: NodeId, side: Side, extra: &Value) -> Args {
    Args::new()
        .with_keyword(keys::PARENT, lattice.data(parent).clone())
        .with_keyword(keys::NODE, lattice.data(id).clone())
        .with_keyword(keys::SIDE, side.to_value())
        .with_keyword(keys::EXTRA, extra.clone())
}

fn call(lattice: &BinaryLattice, id: NodeId, formula: &Formula, args: &Args) -> Result<Value, LatticeError> {
    formula.call(args).map_err(|error| {
        let address = lattice.address_of(id).to_string();
        trace!("Formula failed at '{}': {}", address, error);
        LatticeError::Formula { address, error }
    })
}

fn write_results(lattice: &mut BinaryLattice, results: Vec<(NodeId, Value)>, output_key: &str) -> usize {
    let count = results.len();
    for (id, value) in results {
        lattice.data_mut(id).insert(output_key.to_string(), value);
    }
    count
}
