//! Grid coordinates and edges.

use std::num::NonZero;

use ndarray::Ix;
use unordered_pair::UnorderedPair;

/// One grid coordinate.
pub type Coord = usize;
/// The side length of a board, which is never zero.
pub type Dimension = NonZero<Coord>;

/// A cell on the grid, `(x, y)` with `x` the column and `y` the row.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
pub struct Location(pub Coord, pub Coord);

/// An undirected connection between two Manhattan-adjacent [`Location`]s.
///
/// Always build these through [`edge_between`] so the pair is stored `(min, max)`.
pub type Edge = UnorderedPair<Location>;

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.1, self.0)
    }

    /// Step by a signed offset. Stepping off the low edge wraps to a huge coordinate, which no
    /// board considers in bounds.
    pub fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    /// Whether this location lies on a `size`×`size` board.
    #[inline]
    pub fn within(&self, size: Coord) -> bool {
        self.0 < size && self.1 < size
    }

    /// Manhattan distance to `other`.
    #[inline]
    pub fn distance(&self, other: Location) -> usize {
        self.0.abs_diff(other.0) + self.1.abs_diff(other.1)
    }

    /// Whether `other` is one orthogonal step away.
    #[inline]
    pub fn is_adjacent(&self, other: Location) -> bool {
        self.distance(other) == 1
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.1, value.0)
    }
}

/// Canonical edge between `a` and `b`, ordered by coordinate so equal edges hash equally.
pub fn edge_between(a: Location, b: Location) -> Edge {
    if a <= b {
        UnorderedPair(a, b)
    } else {
        UnorderedPair(b, a)
    }
}
