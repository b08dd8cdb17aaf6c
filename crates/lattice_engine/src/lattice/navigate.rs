//! Walking the lattice with `P`/`L`/`R` instruction strings.

use lattice_core::types::NavigationError;

use super::address::Side;
use super::binary::BinaryLattice;
use super::node::NodeId;

/// One navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Move to the parent.
    Parent,
    /// Move to the left child.
    Left,
    /// Move to the right child.
    Right,
}

impl Instruction {
    /// Parses `P`, `L` or `R`, case-insensitively.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(Instruction::Parent),
            'L' => Some(Instruction::Left),
            'R' => Some(Instruction::Right),
            _ => None,
        }
    }
}

/// What to do when a navigation rule is broken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Return an error.
    #[default]
    Fail,
    /// Treat the instruction as a no-op and stay in place.
    Ignore,
}

/// Independent policies for the two ways a walk can go wrong.
///
/// # Examples
///
/// ```
/// use lattice_engine::lattice::{NavigationPolicy, Strictness};
///
/// let policy = NavigationPolicy::strict().with_off_tree(Strictness::Ignore);
/// assert_eq!(policy.on_invalid_char, Strictness::Fail);
/// assert_eq!(policy.on_off_tree, Strictness::Ignore);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationPolicy {
    /// Character outside `{P, L, R}`.
    pub on_invalid_char: Strictness,
    /// Step that would leave the tree (`P` at the root, missing child).
    pub on_off_tree: Strictness,
}

impl NavigationPolicy {
    /// Fail on both.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Stay in place on both.
    pub fn lenient() -> Self {
        Self {
            on_invalid_char: Strictness::Ignore,
            on_off_tree: Strictness::Ignore,
        }
    }

    /// Replaces the invalid-character policy.
    pub fn with_invalid_char(mut self, strictness: Strictness) -> Self {
        self.on_invalid_char = strictness;
        self
    }

    /// Replaces the off-tree policy.
    pub fn with_off_tree(mut self, strictness: Strictness) -> Self {
        self.on_off_tree = strictness;
        self
    }
}

impl BinaryLattice {
    /// Walks from `start` following `instructions` left to right.
    ///
    /// # Errors
    ///
    /// - `NavigationError::InvalidInstruction` for a character outside
    ///   `{P, L, R}` when `policy.on_invalid_char` is `Fail`
    /// - `NavigationError::OffTree` for a step leaving the tree when
    ///   `policy.on_off_tree` is `Fail`
    ///
    /// # Examples
    ///
    /// ```
    /// use lattice_engine::lattice::{NavigationPolicy, PerfectLattice};
    /// use lattice_core::types::NodeData;
    ///
    /// let lattice = PerfectLattice::generate(2, NodeData::new).unwrap();
    /// let root = lattice.root();
    ///
    /// let lr = lattice.navigate(root, "lrPr", NavigationPolicy::strict()).unwrap();
    /// assert_eq!(lattice.address_of(lr).as_str(), "LR");
    ///
    /// assert!(lattice.navigate(root, "P", NavigationPolicy::strict()).is_err());
    /// let stay = lattice.navigate(root, "P", NavigationPolicy::lenient()).unwrap();
    /// assert_eq!(stay, root);
    /// ```
    pub fn navigate(
        &self,
        start: NodeId,
        instructions: &str,
        policy: NavigationPolicy,
    ) -> Result<NodeId, NavigationError> {
        let mut current = start;

        for (position, c) in instructions.chars().enumerate() {
            let Some(instruction) = Instruction::from_char(c) else {
                match policy.on_invalid_char {
                    Strictness::Fail => {
                        return Err(NavigationError::InvalidInstruction { found: c, position })
                    }
                    Strictness::Ignore => continue,
                }
            };

            let next = match instruction {
                Instruction::Parent => self.parent_of(current),
                Instruction::Left => self.child_of(current, Side::Left),
                Instruction::Right => self.child_of(current, Side::Right),
            };

            match (next, policy.on_off_tree) {
                (Some(node), _) => current = node,
                (None, Strictness::Ignore) => {}
                (None, Strictness::Fail) => {
                    return Err(NavigationError::OffTree {
                        instruction: c,
                        position,
                        address: self.address_of(current).to_string(),
                    })
                }
            }
        }

        Ok(current)
    }
}
