use std::collections::HashSet;

use crate::location::{Edge, Location};
use crate::pair::{Pair, Pairs};
use crate::path::Path;

/// Cells and edges already spoken for during one routing attempt.
///
/// Owned by a single [`SequentialRouter::route`](crate::SequentialRouter::route) call and only
/// ever grows while that call runs.
#[derive(Clone, Debug, Default)]
pub struct Constraints {
    blocked_cells: HashSet<Location>,
    blocked_edges: HashSet<Edge>,
}

impl Constraints {
    /// Fresh constraints with every endpoint of `pairs` blocked and no edge used.
    pub fn from_pairs(pairs: &Pairs) -> Self {
        Self {
            blocked_cells: pairs.values().flat_map(|pair| [pair.start, pair.end]).collect(),
            blocked_edges: HashSet::new(),
        }
    }

    /// Whether a path for `pair` may enter `location`. The pair's own endpoints never block it.
    #[inline]
    pub fn cell_open_for(&self, pair: &Pair, location: Location) -> bool {
        pair.is_endpoint(location) || !self.blocked_cells.contains(&location)
    }

    /// Whether no committed path uses `edge`.
    #[inline]
    pub fn edge_open(&self, edge: &Edge) -> bool {
        !self.blocked_edges.contains(edge)
    }

    /// Reserve every edge and every interior cell of `path`.
    pub fn commit(&mut self, path: &Path) {
        self.blocked_edges.extend(path.edges());
        self.blocked_cells.extend(path.interior().iter().copied());
    }

    /// Endpoints and every committed interior cell.
    pub fn blocked_cells(&self) -> &HashSet<Location> {
        &self.blocked_cells
    }

    /// Every edge of every committed path.
    pub fn blocked_edges(&self) -> &HashSet<Edge> {
        &self.blocked_edges
    }
}
