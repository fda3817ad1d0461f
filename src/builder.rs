//! Incremental and random board construction.

use std::collections::BTreeMap;
use std::num::NonZero;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::board::{Board, PlacementError};
use crate::color::Color;
use crate::location::{Dimension, Location};
use crate::pair::PairOptions;

/// Builds a [`Board`] one pair at a time.
///
/// The first placement that fails puts the builder into an invalid state: every further call
/// does nothing and [`build`](Self::build) reports that first failure.
/// Builders can be [`Clone`]d to save their state at some point.
#[derive(Clone, Debug)]
pub struct BoardBuilder {
    board: Board,
    invalid_reason: Option<PlacementError>,
    // colors in the order they were added, for pop_pair
    added: Vec<Color>,
}

const DEFAULT_SIZE: Dimension = match NonZero::new(8) {
    Some(size) => size,
    None => panic!(),
};

impl Default for BoardBuilder {
    fn default() -> Self {
        Self::with_size(DEFAULT_SIZE)
    }
}

impl BoardBuilder {
    /// Start from an empty `size`×`size` board.
    pub fn with_size(size: Dimension) -> Self {
        Self {
            board: Board::new(size),
            invalid_reason: None,
            added: Vec::new(),
        }
    }

    /// Build a board from a complete endpoint map.
    pub fn from_pairs(size: Dimension, pairs: &BTreeMap<Color, (Location, Location)>) -> Result<Board, PlacementError> {
        let mut builder = Self::with_size(size);
        for (color, locations) in pairs {
            builder.add_pair(*color, *locations);
        }
        builder.build()
    }

    /// Scatter `count` pairs over distinct cells of a `size`×`size` board, reproducibly for a
    /// given `seed`. Colors are numbered from 1; fewer pairs are placed if the board fills up.
    pub fn random(size: Dimension, count: usize, seed: u64) -> Board {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut locations = (0..size.get())
            .cartesian_product(0..size.get())
            .map(|(y, x)| Location(x, y))
            .collect_vec();
        locations.shuffle(&mut rng);

        let mut board = Board::new(size);
        for (color, chunk) in (1..).filter_map(NonZero::new).zip(locations.chunks_exact(2).take(count)) {
            for location in chunk {
                // every location is distinct and on the board
                let _ = board.place(color, *location);
            }
        }
        board
    }

    /// Add both endpoints of `color`. The order of `locations` decides which end a path starts from.
    pub fn add_pair(&mut self, color: Color, locations: (Location, Location)) -> &mut Self {
        if self.invalid_reason.is_some() {
            return self;
        }

        for location in [locations.0, locations.1] {
            if let Err(reason) = self.board.place(color, location) {
                self.invalid_reason = Some(reason);
                return self;
            }
        }
        self.added.push(color);

        self
    }

    /// Remove the most recently added pair.
    ///
    /// If the builder is in an invalid state or no pairs are present, this function does nothing.
    pub fn pop_pair(&mut self) -> &mut Self {
        if self.invalid_reason.is_some() {
            return self;
        }

        if let Some(color) = self.added.pop() {
            self.board.remove_pair(color);
        }

        self
    }

    /// Set the [`PairOptions`] of `color`.
    pub fn configure(&mut self, color: Color, options: PairOptions) -> &mut Self {
        if self.invalid_reason.is_none() {
            self.board.configure(color, options);
        }

        self
    }

    /// The first reason this builder became invalid, if it has.
    pub fn invalid_reason(&self) -> Option<&PlacementError> {
        self.invalid_reason.as_ref()
    }

    /// The finished board, or the first reason it could not be built.
    ///
    /// A color with a single endpoint also fails here.
    pub fn build(&self) -> Result<Board, PlacementError> {
        if let Some(reason) = self.invalid_reason {
            return Err(reason);
        }

        self.board.pairs()?;
        Ok(self.board.clone())
    }
}
