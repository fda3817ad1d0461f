use std::collections::BTreeMap;

use crate::color::Color;
use crate::location::Location;

/// Per-pair switches that change how a single pair is scheduled and searched.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PairOptions {
    /// Route this pair before every other pair in the default order.
    pub lead: bool,
    /// Search the whole board for this pair, ignoring bounding-box pruning.
    pub unbounded: bool,
    /// Break ties between equally scored search states at random, so repeated attempts can
    /// find different routes.
    pub jitter: bool,
}

/// Two endpoints sharing a color, validated against their board.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Pair {
    /// The pair's color.
    pub color: Color,
    /// Where a path for this pair begins.
    pub start: Location,
    /// Where a path for this pair ends.
    pub end: Location,
    /// How this pair is scheduled and searched.
    pub options: PairOptions,
}

impl Pair {
    /// A pair with default options.
    pub fn new(color: Color, (start, end): (Location, Location)) -> Self {
        Self { color, start, end, options: PairOptions::default() }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: PairOptions) -> Self {
        self.options = options;
        self
    }

    /// Manhattan distance between the endpoints.
    #[inline]
    pub fn distance(&self) -> usize {
        self.start.distance(self.end)
    }

    /// Whether `location` is one of the two endpoints.
    #[inline]
    pub fn is_endpoint(&self, location: Location) -> bool {
        location == self.start || location == self.end
    }
}

/// Every pair of a board, keyed and iterated by ascending color.
pub type Pairs = BTreeMap<Color, Pair>;
