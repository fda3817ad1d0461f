//! Directions of travel on the grid.

use std::hash::Hash;

use strum::VariantArray;

use crate::location::Location;

/// Movement on a grid, implemented once per cell shape.
pub trait Step: Sized + Copy + VariantArray + PartialEq + Eq + Hash + Ord + PartialOrd {
    /// Attempt the step from `location` in the direction specified by `self` and return the resultant [`Location`].
    fn attempt_from(&self, location: Location) -> Location;
    /// The static array of all "forward" directions.
    ///
    /// Forward directions are those which, upon stepping from one location to another, cause the destination to be indexed higher than the origin.
    const FORWARD_VARIANTS: &'static [Self];
}

/// The four orthogonal moves of a square grid.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum SquareStep {
    /// Toward row 0.
    Up,
    /// Away from row 0.
    Down,
    /// Toward column 0.
    Left,
    /// Away from column 0.
    Right,
}

impl Step for SquareStep {
    fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((0, -1)),
            Self::Down => location.offset_by((0, 1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
        }
    }

    const FORWARD_VARIANTS: &'static [Self] = &[Self::Right, Self::Down];
}

impl SquareStep {
    /// The first move a straight run from `from` toward `to` would take, rows before columns.
    ///
    /// [`None`] when the two locations coincide.
    pub fn toward(from: Location, to: Location) -> Option<Self> {
        if to.1 < from.1 {
            Some(Self::Up)
        } else if to.1 > from.1 {
            Some(Self::Down)
        } else if to.0 > from.0 {
            Some(Self::Right)
        } else if to.0 < from.0 {
            Some(Self::Left)
        } else {
            None
        }
    }
}

/// Functionality on top of [`Step`] with identical implementation across all shapes.
pub trait BoardShape: Step {
    /// Get all neighbors of a [`Location`] in "theory", by attempting every step direction in `Self::VARIANTS`.
    fn neighbors_of(location: Location) -> impl Iterator<Item = (Self, Location)>;
    /// Determine the direction from `a` to `b` by calling [`attempt_from`](Step::attempt_from) until one works.
    ///
    /// This does not consider any graph-based information, such as board bounds.
    /// It returns [`None`] unless `a` and `b` are adjacent.
    fn direction_to(a: Location, b: Location) -> Option<Self>;
}

impl<Sh> BoardShape for Sh
where
    Sh: Step + 'static,
{
    fn neighbors_of(location: Location) -> impl Iterator<Item = (Self, Location)> {
        Self::VARIANTS.iter().map(move |dir| (*dir, dir.attempt_from(location)))
    }

    fn direction_to(a: Location, b: Location) -> Option<Self> {
        Self::VARIANTS.iter().find(|dir| dir.attempt_from(a) == b).copied()
    }
}
