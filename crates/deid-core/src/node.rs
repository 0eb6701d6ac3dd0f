//! Lattice coordinates.

use std::fmt;
use std::ops::Index;

/// One generalization level per attribute.
///
/// Nodes order lexicographically, which is the order used when walking a
/// level of the lattice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node(Vec<usize>);

impl Node {
    #[must_use]
    pub fn new(levels: Vec<usize>) -> Self {
        Self(levels)
    }

    /// The bottom node for `len` attributes.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    /// Sum of the components; the lattice level this node lives on.
    #[must_use]
    pub fn level(&self) -> usize {
        self.0.iter().sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn levels(&self) -> &[usize] {
        &self.0
    }

    /// Component-wise `self >= other`.
    #[must_use]
    pub fn dominates(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a >= b)
    }
}

impl From<Vec<usize>> for Node {
    fn from(value: Vec<usize>) -> Self {
        Self(value)
    }
}

impl Index<usize> for Node {
    type Output = usize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, level) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{level}")?;
        }
        f.write_str(")")
    }
}
