//! Error types for structured error handling.
//!
//! This module provides:
//! - `StructureError`: Lattice topology violations detected at construction
//! - `AdapterError`: Invalid argument adapter specifications
//! - `LookupError`: Missing keys, indices or addresses at call time
//! - `NavigationError`: Navigation through bad instructions or off the tree
//! - `PreconditionError`: Missing seed data and height guard violations
//! - `FormulaError`: Failures raised while evaluating a formula
//! - `ConfigError`: Invalid engine configuration
//! - `LatticeError`: Umbrella error returned by engine operations
//!
//! No error is recovered internally: every variant names the invariant or
//! precondition that was violated.

use thiserror::Error;

/// Topology violations detected while building a lattice.
///
/// # Examples
/// ```
/// use lattice_core::types::StructureError;
///
/// let err = StructureError::MultipleRoots { count: 2 };
/// assert_eq!(format!("{}", err), "Multiple roots: 2 parentless nodes");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// Every candidate node has a parent.
    #[error("No root: every node has a parent")]
    NoRoot,

    /// More than one parentless node.
    #[error("Multiple roots: {count} parentless nodes")]
    MultipleRoots {
        /// Number of parentless nodes found
        count: usize,
    },

    /// Address contains a character other than `L` or `R`.
    #[error("Invalid address '{address}': '{found}' is not L or R")]
    InvalidAddress {
        /// Offending address
        address: String,
        /// First invalid character
        found: char,
    },

    /// Address whose parent address is absent from the lattice.
    #[error("Orphan address '{address}': parent address is missing")]
    OrphanAddress {
        /// Offending address
        address: String,
    },

    /// Loose node referencing a child index outside the node list.
    #[error("Node {index} references missing child {child}")]
    DanglingChild {
        /// Index of the referencing node
        index: usize,
        /// Referenced child index
        child: usize,
    },

    /// Loose node reachable through more than one parent edge.
    #[error("Node {child} is referenced as a child more than once")]
    DuplicateChild {
        /// Index of the shared child
        child: usize,
    },

    /// Loose nodes not reachable from the root.
    #[error("{count} nodes are not reachable from the root")]
    UnreachableNodes {
        /// Number of unreached nodes
        count: usize,
    },

    /// Parent-child edge count differs from node count minus one.
    #[error("Edge count mismatch: {edges} edges for {nodes} nodes, a tree has nodes - 1")]
    EdgeCountMismatch {
        /// Edges counted
        edges: usize,
        /// Nodes counted
        nodes: usize,
    },

    /// Leaf depth differs from the lattice height.
    #[error("Leaf '{address}' at depth {found}, expected uniform depth {expected}")]
    NonUniformDepth {
        /// Offending leaf address
        address: String,
        /// Depth of the first leaf
        expected: usize,
        /// Depth of the offending leaf
        found: usize,
    },

    /// Node count is not of the form 2^(h+1) - 1.
    #[error("Not a perfect lattice: {size} nodes is not 2^(h+1) - 1")]
    NotPerfect {
        /// Node count
        size: usize,
    },

    /// Two construction inputs normalise to different address maps.
    #[error("Construction inputs disagree: {0}")]
    DisagreeingInputs(String),

    /// No construction input was supplied.
    #[error("Empty source: a root node, node list or address map is required")]
    EmptySource,
}

/// Invalid argument adapter specification, raised at construction.
///
/// # Examples
/// ```
/// use lattice_core::types::AdapterError;
///
/// let err = AdapterError::NonContiguousPositions { max: 2, count: 2 };
/// assert!(format!("{}", err).contains("gap"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Same output slot configured twice.
    #[error("Duplicate output slot {slot}")]
    DuplicateSlot {
        /// Offending slot
        slot: String,
    },

    /// Output keyword is the empty string.
    #[error("Output key must be a non-empty string")]
    EmptyOutputKey,

    /// Keyword source is the empty string.
    #[error("Slot {slot}: source key must be a non-empty string")]
    EmptySourceKey {
        /// Offending slot
        slot: String,
    },

    /// Source kind disagrees with the type of the source reference.
    #[error("Slot {slot}: {kind} source needs {expected}")]
    SourceKindMismatch {
        /// Offending slot
        slot: String,
        /// Declared source kind
        kind: &'static str,
        /// What that kind requires
        expected: &'static str,
    },

    /// Source kind label does not start with `p` or `k`.
    #[error("Unknown source kind '{0}': expected positional or keyword")]
    UnknownSourceKind(String),

    /// Inner key is the empty string.
    #[error("Slot {slot}: inner key must be a non-empty string")]
    EmptyInnerKey {
        /// Offending slot
        slot: String,
    },

    /// Output positions do not form 0..=max and gap filling is off.
    #[error("Output positions have a gap: max position {max} with {count} positions (enable gap filling to null-fill)")]
    NonContiguousPositions {
        /// Largest configured output position
        max: usize,
        /// Number of configured output positions
        count: usize,
    },

    /// Output position beyond the supported positional arity.
    #[error("Output position {position} exceeds the maximum {max}")]
    PositionTooLarge {
        /// Configured output position
        position: usize,
        /// Largest accepted output position
        max: usize,
    },

    /// Positional and keyword inputs coexist.
    #[error("Positional and keyword inputs cannot coexist")]
    MixedInputs,

    /// Positional and keyword outputs coexist.
    #[error("Positional and keyword outputs cannot coexist")]
    MixedOutputs,

    /// Output position fed from a keyword input, or key from a positional input.
    #[error("Slot {slot}: influence crosses sides (positional and keyword must stay separate)")]
    CrossInfluence {
        /// Offending slot
        slot: String,
    },

    /// Inner key required (inputs are dict-like) but absent.
    #[error("Slot {slot}: inner key required, all inputs are maps")]
    InnerKeyRequired {
        /// Offending slot
        slot: String,
    },

    /// Inner key forbidden (inputs are scalars) but present.
    #[error("Slot {slot}: inner key forbidden, no input is a map")]
    InnerKeyForbidden {
        /// Offending slot
        slot: String,
    },

    /// Both inner-key policies requested at once.
    #[error("Inner keys cannot be both required and forbidden")]
    ConflictingInnerKeyPolicies,
}

/// Lookup failures at call time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Positional index beyond the supplied arguments.
    #[error("Missing positional argument {index} (got {len})")]
    MissingPositional {
        /// Requested index
        index: usize,
        /// Number of positional arguments
        len: usize,
    },

    /// Keyword not supplied.
    #[error("Missing keyword argument '{key}'")]
    MissingKeyword {
        /// Requested key
        key: String,
    },

    /// Inner key absent from a map argument.
    #[error("Argument {argument} has no key '{key}'")]
    MissingInnerKey {
        /// Argument description
        argument: String,
        /// Requested inner key
        key: String,
    },

    /// Inner lookup on a value that is not a map.
    #[error("Argument {argument} is a {found}, expected a map")]
    NotAMap {
        /// Argument description
        argument: String,
        /// Kind of the value found
        found: &'static str,
    },

    /// Number expected.
    #[error("Argument {argument} is a {found}, expected a number")]
    NotANumber {
        /// Argument description
        argument: String,
        /// Kind of the value found
        found: &'static str,
    },

    /// Address not present in the lattice.
    #[error("Unknown address '{address}'")]
    UnknownAddress {
        /// Requested address
        address: String,
    },
}

/// Navigation failures, raised only under the failing policies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Instruction character outside `{P, L, R}` (case-insensitive).
    #[error("Invalid instruction '{found}' at position {position}: expected P, L or R")]
    InvalidInstruction {
        /// Offending character
        found: char,
        /// Character position in the instruction string
        position: usize,
    },

    /// Instruction would leave the tree.
    #[error("Instruction '{instruction}' at position {position} leaves the tree from '{address}'")]
    OffTree {
        /// Offending instruction
        instruction: char,
        /// Character position in the instruction string
        position: usize,
        /// Address of the node the walk was at
        address: String,
    },
}

/// Preconditions checked before a pass or allocation starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// A leaf has no seed value for propagate-up.
    #[error("Leaf '{address}' has no seed value at '{key}'")]
    MissingLeafSeed {
        /// Leaf address
        address: String,
        /// Output key
        key: String,
    },

    /// The root has no seed value for propagate-down.
    #[error("Root has no seed value at '{key}'")]
    MissingRootSeed {
        /// Output key
        key: String,
    },

    /// Requested height exceeds the configured guard.
    #[error("Height {height} exceeds maximum {max} (2^(h+1) - 1 nodes)")]
    HeightLimitExceeded {
        /// Requested height
        height: u32,
        /// Configured limit
        max: u32,
    },
}

/// Failure while evaluating a formula.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    /// Argument lookup failed (adapter transform or function body).
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Domain function reported a failure.
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}

/// Configuration error for the propagation engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Maximum height outside [0, 30].
    #[error("Invalid max height {0}: must be in range [0, 30]")]
    InvalidMaxHeight(u32),

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },

    /// Configuration text could not be parsed.
    #[error("Config parse error: {0}")]
    Parse(String),
}

/// Umbrella error for lattice construction and propagation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LatticeError {
    /// Invalid topology.
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// Invalid adapter spec table.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Call-time lookup failure.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Navigation failure.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// Missing seed or height limit.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// Formula failed at a specific node; the pass was aborted.
    #[error("Formula failed at node '{address}': {error}")]
    Formula {
        /// Address of the node being computed
        address: String,
        /// Underlying failure
        #[source]
        error: FormulaError,
    },

    /// Invalid engine configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_structure_error_display() {
        let err = StructureError::EdgeCountMismatch { edges: 3, nodes: 3 };
        assert!(err.to_string().contains("3 edges for 3 nodes"));

        let err = StructureError::InvalidAddress {
            address: "LX".to_string(),
            found: 'X',
        };
        assert_eq!(err.to_string(), "Invalid address 'LX': 'X' is not L or R");
    }

    #[test]
    fn test_adapter_error_display() {
        let err = AdapterError::DuplicateSlot {
            slot: "#0".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate output slot #0");
    }

    #[test]
    fn test_formula_error_from_lookup() {
        let err: FormulaError = LookupError::MissingKeyword {
            key: "extra".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Missing keyword argument 'extra'");
    }

    #[test]
    fn test_lattice_error_transparent() {
        let err: LatticeError = PreconditionError::MissingRootSeed {
            key: "price".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Root has no seed value at 'price'");
    }

    #[test]
    fn test_lattice_error_formula_source() {
        let err = LatticeError::Formula {
            address: "LR".to_string(),
            error: FormulaError::Evaluation("negative probability".to_string()),
        };
        assert!(err.to_string().starts_with("Formula failed at node 'LR'"));
        assert!(err.source().is_some());
    }
}
