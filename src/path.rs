use std::collections::{BTreeMap, HashMap, HashSet};

use itertools::Itertools;
use thiserror::Error;

use crate::color::Color;
use crate::location::{edge_between, Edge, Location};
use crate::pair::Pairs;
use crate::shape::{BoardShape, SquareStep};

/// Extra cost of one direction change when scoring with the turn penalty.
pub const TURN_COST: usize = 2;

/// A route between the two endpoints of one pair, start first.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Path(Vec<Location>);

impl Path {
    pub(crate) fn new(cells: Vec<Location>) -> Self {
        Self(cells)
    }

    /// All cells, endpoints included, in travel order.
    pub fn cells(&self) -> &[Location] {
        &self.0
    }

    /// The first cell.
    pub fn start(&self) -> Option<Location> {
        self.0.first().copied()
    }

    /// The last cell.
    pub fn end(&self) -> Option<Location> {
        self.0.last().copied()
    }

    /// Number of steps, i.e. cells minus one.
    pub fn length(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Cells strictly between the two endpoints.
    pub fn interior(&self) -> &[Location] {
        match self.0.len() {
            0..=2 => &[],
            n => &self.0[1..n - 1],
        }
    }

    /// Every edge between consecutive cells.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.0.iter().tuple_windows().map(|(a, b)| edge_between(*a, *b))
    }

    /// How many times the path changes direction.
    pub fn turns(&self) -> usize {
        self.0.iter()
            .tuple_windows()
            .map(|(a, b)| SquareStep::direction_to(*a, *b))
            .tuple_windows()
            .filter(|(previous, current)| previous != current)
            .count()
    }

    /// Step count, plus [`TURN_COST`] per direction change if `turn_penalty` is set.
    pub fn cost(&self, turn_penalty: bool) -> usize {
        self.cost_with(if turn_penalty { TURN_COST } else { 0 })
    }

    pub(crate) fn cost_with(&self, turn_cost: usize) -> usize {
        self.length() + turn_cost * self.turns()
    }

    /// Whether this is a simple path of adjacent cells running from `start` to `end`.
    pub fn connects(&self, start: Location, end: Location) -> bool {
        if self.start() != Some(start) || self.end() != Some(end) {
            return false;
        }
        if !self.0.iter().tuple_windows().all(|(a, b)| a.is_adjacent(*b)) {
            return false;
        }

        self.0.iter().all_unique()
    }
}

/// Why a [`Solution`] does not solve its pairs.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Violation {
    /// A pair has no path.
    #[error("color {color} has no path")]
    Missing {
        /// The unconnected pair.
        color: Color,
    },
    /// A path does not run between its pair's endpoints.
    #[error("path for color {color} does not connect its endpoints")]
    Broken {
        /// The pair whose path is malformed.
        color: Color,
    },
    /// Two paths use the same edge.
    #[error("colors {first} and {second} both use the edge {edge:?}")]
    SharedEdge {
        /// The color checked first.
        first: Color,
        /// The color checked second.
        second: Color,
        /// The shared edge.
        edge: Edge,
    },
    /// A path passes through another path's cell or any endpoint.
    #[error("colors {first} and {second} both pass through {location:?}")]
    SharedCell {
        /// The color owning the cell.
        first: Color,
        /// The color passing through it.
        second: Color,
        /// The shared cell.
        location: Location,
    },
}

/// One path per color, the result of a successful route.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Solution {
    paths: BTreeMap<Color, Path>,
}

impl Solution {
    pub(crate) fn insert(&mut self, color: Color, path: Path) {
        self.paths.insert(color, path);
    }

    /// The path of `color`.
    pub fn get(&self, color: Color) -> Option<&Path> {
        self.paths.get(&color)
    }

    /// Every path, ascending by color.
    pub fn iter(&self) -> impl Iterator<Item = (Color, &Path)> {
        self.paths.iter().map(|(color, path)| (*color, path))
    }

    /// Number of paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether there are no paths at all.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Non-endpoint cells covered by all paths together.
    pub fn cells_used(&self) -> usize {
        self.paths.values().map(|path| path.interior().len()).sum()
    }

    /// Sum of [`Path::cost`] over all paths.
    pub fn total_cost(&self, turn_penalty: bool) -> usize {
        self.paths.values().map(|path| path.cost(turn_penalty)).sum()
    }

    /// Take the paths out, keyed by color.
    pub fn into_paths(self) -> BTreeMap<Color, Path> {
        self.paths
    }

    /// Check that every pair is connected, no two paths share an edge, and no interior cell is
    /// shared with another path or sits on any endpoint.
    pub fn verify(&self, pairs: &Pairs) -> Result<(), Violation> {
        // endpoints count as owned by their color
        let mut cell_owner: HashMap<Location, Color> = pairs.values()
            .flat_map(|pair| [(pair.start, pair.color), (pair.end, pair.color)])
            .collect();
        let mut edge_owner: HashMap<Edge, Color> = HashMap::new();

        for pair in pairs.values() {
            let path = self.get(pair.color).ok_or(Violation::Missing { color: pair.color })?;
            if !path.connects(pair.start, pair.end) {
                return Err(Violation::Broken { color: pair.color });
            }

            for edge in path.edges() {
                if let Some(first) = edge_owner.insert(edge, pair.color) {
                    return Err(Violation::SharedEdge { first, second: pair.color, edge });
                }
            }

            let interior: HashSet<_> = path.interior().iter().copied().collect();
            for location in interior {
                if let Some(first) = cell_owner.insert(location, pair.color) {
                    return Err(Violation::SharedCell { first, second: pair.color, location });
                }
            }
        }

        Ok(())
    }
}

impl IntoIterator for Solution {
    type Item = (Color, Path);
    type IntoIter = std::collections::btree_map::IntoIter<Color, Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}
