//! The board: endpoint placement, validation, and rendering.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use thiserror::Error;

use crate::cell::Cell;
use crate::color::Color;
use crate::location::{Dimension, Location};
use crate::pair::{Pair, PairOptions, Pairs};
use crate::path::Solution;
use crate::shape::{SquareStep, Step};

/// The ways two placements can collide.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Duplicate {
    /// The location already holds an endpoint, possibly of the same color.
    Overlap(Location),
    /// The color ends up with this many endpoints instead of two.
    EndpointCount(usize),
}

/// Reasons an endpoint placement or a set of pairs is rejected.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum PlacementError {
    /// An endpoint lies off the board.
    #[error("{location:?} is outside the board")]
    OutOfBounds {
        /// The offending endpoint.
        location: Location,
    },
    /// An endpoint collides with another, or a color does not have exactly two.
    #[error("color {color} is placed inconsistently: {reason:?}")]
    DuplicatePlacement {
        /// The color being placed or checked.
        color: Color,
        /// How the placement collides.
        reason: Duplicate,
    },
}

/// A square grid holding the endpoints of every pair.
///
/// Besides the endpoints, the board owns its adjacency graph: one node per cell, one edge per
/// pair of orthogonal neighbors.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) size: Dimension,
    pub(crate) cells: Array2<Cell>,
    pub(crate) graph: UnGraphMap<Location, SquareStep>,
    endpoints: BTreeMap<Color, Vec<Location>>,
    options: BTreeMap<Color, PairOptions>,
}

impl Board {
    /// An empty `size`×`size` board.
    pub fn new(size: Dimension) -> Self {
        let n = size.get();
        let mut graph = UnGraphMap::with_capacity(
            n * n,
            // one "horizontal" and one "vertical" edge per cell, minus the last column and row
            2 * n * (n - 1),
        );

        for y in 0..n {
            for x in 0..n {
                let location = Location(x, y);
                graph.add_node(location);
                // add edges down and to the right, if possible
                for direction in SquareStep::FORWARD_VARIANTS {
                    let neighbor = direction.attempt_from(location);
                    if neighbor.within(n) {
                        graph.add_edge(location, neighbor, *direction);
                    }
                }
            }
        }

        Self {
            size,
            cells: Array2::from_shape_simple_fn((n, n), Cell::default),
            graph,
            endpoints: Default::default(),
            options: Default::default(),
        }
    }

    /// Width and height of the board.
    #[inline]
    pub fn size(&self) -> usize {
        self.size.get()
    }

    /// What sits at `location`; [`None`] off the board.
    pub fn cell(&self, location: Location) -> Option<Cell> {
        self.cells.get(location.as_index()).copied()
    }

    /// Whether a path may step directly between `a` and `b`.
    #[inline]
    pub fn connected(&self, a: Location, b: Location) -> bool {
        self.graph.contains_edge(a, b)
    }

    /// Put one endpoint of `color` at `location`.
    pub fn place(&mut self, color: Color, location: Location) -> Result<(), PlacementError> {
        if !location.within(self.size()) {
            return Err(PlacementError::OutOfBounds { location });
        }
        if self.cell(location) != Some(Cell::Empty) {
            return Err(PlacementError::DuplicatePlacement { color, reason: Duplicate::Overlap(location) });
        }

        let placed = self.endpoints.entry(color).or_default();
        if placed.len() >= 2 {
            return Err(PlacementError::DuplicatePlacement { color, reason: Duplicate::EndpointCount(placed.len() + 1) });
        }
        placed.push(location);
        self.cells[location.as_index()] = Cell::Terminus { color };

        Ok(())
    }

    /// Take the endpoint at `location` off the board, returning its color.
    pub fn remove(&mut self, location: Location) -> Option<Color> {
        let color = match self.cell(location)? {
            Cell::Terminus { color } => color,
            _ => return None,
        };
        self.cells[location.as_index()] = Cell::Empty;

        if let Some(placed) = self.endpoints.get_mut(&color) {
            placed.retain(|l| *l != location);
            if placed.is_empty() {
                self.endpoints.remove(&color);
                self.options.remove(&color);
            }
        }

        Some(color)
    }

    /// Take both endpoints of `color` off the board.
    pub fn remove_pair(&mut self, color: Color) -> bool {
        let Some(placed) = self.endpoints.remove(&color) else {
            return false;
        };
        for location in placed {
            self.cells[location.as_index()] = Cell::Empty;
        }
        self.options.remove(&color);
        true
    }

    /// Set the [`PairOptions`] of `color`. They are dropped along with its endpoints.
    pub fn configure(&mut self, color: Color, options: PairOptions) {
        self.options.insert(color, options);
    }

    /// Colors with at least one endpoint on the board, ascending.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.endpoints.keys().copied()
    }

    /// Neighbors of `location` reachable in one step that are not endpoints.
    pub fn free_neighbors(&self, location: Location) -> usize {
        if !self.graph.contains_node(location) {
            return 0;
        }

        self.graph.neighbors(location)
            .filter(|neighbor| self.cell(*neighbor) == Some(Cell::Empty))
            .count()
    }

    /// Validate the placements and collect them as [`Pairs`].
    pub fn pairs(&self) -> Result<Pairs, PlacementError> {
        self.endpoints.iter()
            .map(|(color, placed)| match placed.as_slice() {
                [start, end] => {
                    let options = self.options.get(color).copied().unwrap_or_default();
                    Ok((*color, Pair::new(*color, (*start, *end)).with_options(options)))
                }
                _ => Err(PlacementError::DuplicatePlacement { color: *color, reason: Duplicate::EndpointCount(placed.len()) }),
            })
            .collect()
    }

    /// The board as one character per cell, with the paths of `solution` drawn in if given.
    pub fn render(&self, solution: Option<&Solution>) -> Array2<char> {
        let mut cells = self.cells.clone();

        for (color, path) in solution.into_iter().flat_map(|solution| solution.iter()) {
            for location in path.cells() {
                if let Some(cell) = cells.get_mut(location.as_index()) {
                    if *cell == Cell::Empty {
                        *cell = Cell::Path { color };
                    }
                }
            }
        }

        cells.map(Cell::glyph)
    }
}

/// Check externally supplied endpoint lists against a `size`×`size` board.
pub fn validate(size: usize, pairs: &BTreeMap<Color, Vec<Location>>) -> Result<(), PlacementError> {
    let mut seen = BTreeMap::new();

    for (color, placed) in pairs {
        if placed.len() != 2 {
            return Err(PlacementError::DuplicatePlacement { color: *color, reason: Duplicate::EndpointCount(placed.len()) });
        }
        for location in placed {
            if !location.within(size) {
                return Err(PlacementError::OutOfBounds { location: *location });
            }
            if seen.insert(*location, *color).is_some() {
                return Err(PlacementError::DuplicatePlacement { color: *color, reason: Duplicate::Overlap(*location) });
            }
        }
    }

    Ok(())
}

/// Lay out a character grid row by row.
pub fn print(grid: &Array2<char>) -> String {
    let mut out = String::with_capacity(grid.nrows() * (grid.ncols() + 1));

    for row in grid.rows() {
        for col in row {
            out.push(*col);
        }
        out.push('\n');
    }

    out
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", print(&self.render(None)))
    }
}
