//! Path addresses of lattice nodes.
//!
//! An address is the string of left/right moves from the root: `""` is the
//! root, `"LR"` is the right child of the root's left child. Its length is
//! the node's depth. Addresses order lexicographically, and since `L < R`
//! that order is the pre-order of the tree.

use lattice_core::types::{StructureError, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Branch direction from a parent to a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Left child (down move in a binomial lattice).
    Left,
    /// Right child (up move in a binomial lattice).
    Right,
}

impl Side {
    /// Address character of this side.
    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Side::Left => 'L',
            Side::Right => 'R',
        }
    }

    /// Parses an address character (`L` or `R`, upper case only).
    #[inline]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'L' => Some(Side::Left),
            'R' => Some(Side::Right),
            _ => None,
        }
    }

    /// The side as a formula argument: `Text("L")` or `Text("R")`.
    pub fn to_value(self) -> Value {
        Value::Text(self.as_char().to_string())
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Validated node address over the alphabet `{L, R}`.
///
/// # Examples
///
/// ```
/// use lattice_engine::lattice::{Address, Side};
///
/// let addr: Address = "LR".parse().unwrap();
/// assert_eq!(addr.depth(), 2);
/// assert_eq!(addr.parent(), Some("L".parse().unwrap()));
/// assert_eq!(addr.last_side(), Some(Side::Right));
/// assert!(Address::root().is_root());
/// assert!("LX".parse::<Address>().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// The root address (empty string).
    #[inline]
    pub fn root() -> Self {
        Address(String::new())
    }

    /// Validates `s` as an address.
    ///
    /// # Errors
    ///
    /// `StructureError::InvalidAddress` naming the first character outside `{L, R}`.
    pub fn parse(s: &str) -> Result<Self, StructureError> {
        match s.chars().find(|c| Side::from_char(*c).is_none()) {
            Some(found) => Err(StructureError::InvalidAddress {
                address: s.to_string(),
                found,
            }),
            None => Ok(Address(s.to_string())),
        }
    }

    /// Address of the node at breadth-first index `index` of a perfect tree
    /// (root 0, children of `i` at `2i + 1` and `2i + 2`).
    pub fn from_heap_index(index: usize) -> Self {
        let position = index + 1;
        let depth = (usize::BITS - position.leading_zeros() - 1) as usize;
        let path = (0..depth)
            .rev()
            .map(|bit| if (position >> bit) & 1 == 1 { 'R' } else { 'L' })
            .collect();
        Address(path)
    }

    /// The address as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Distance from the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root address.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Address of the parent, `None` for the root.
    pub fn parent(&self) -> Option<Address> {
        if self.is_root() {
            None
        } else {
            Some(Address(self.0[..self.0.len() - 1].to_string()))
        }
    }

    /// Address of the child on `side`.
    pub fn child(&self, side: Side) -> Address {
        let mut path = String::with_capacity(self.0.len() + 1);
        path.push_str(&self.0);
        path.push(side.as_char());
        Address(path)
    }

    /// Side of the last move, `None` for the root.
    pub fn last_side(&self) -> Option<Side> {
        self.0.chars().last().and_then(Side::from_char)
    }

    /// Moves from the root, in order.
    pub fn sides(&self) -> impl Iterator<Item = Side> + '_ {
        self.0.chars().filter_map(Side::from_char)
    }

    /// Number of right (up) moves along the path.
    pub fn right_moves(&self) -> usize {
        self.sides().filter(|s| *s == Side::Right).count()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = StructureError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Address::parse(&s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
