#![warn(missing_docs)]

//! # `crossline`
//!
//! A router for the "crossline" family of grid puzzles: pairs of colored endpoints on an N×N board must be connected
//! by paths that never share a grid edge or an interior cell, preferring short paths and, optionally, few turns.
//!
//! Begin by building a board with [`BoardBuilder`] (or [`Board::new`] and [`Board::place`]).
//! Hand it to an [`OrderExplorer`] and call [`solve()`](OrderExplorer::solve), yielding a [`Solution`] with one
//! [`Path`] per color, which [`Board::render`] can draw back onto the board.
//!
//! # Internals
//! Connecting many pairs disjointly is hard in general, so this crate does not try to be exact.
//! A high level overview is as follows:
//!
//! 1. [`PathSearch`] connects a single pair with a bidirectional A* over `(cell, heading)` states, so that a
//! change of direction can be charged for. It respects the cells and edges already taken by other colors.
//! 2. [`SequentialRouter`] runs that search once per color in some order, committing each path before moving
//! on to the next and giving up at the first color that cannot be connected.
//! 3. [`OrderExplorer`] picks the orders: the [`default_order`] routes the most constrained pairs first, and when
//! that fails and there are few enough pairs, every permutation of the colors is tried until one works.
//!
//! [`SolveHandle`] runs the whole thing on a background thread with progress events.

pub use board::{validate, Board, Duplicate, PlacementError};
pub use builder::BoardBuilder;
pub use cell::Cell;
pub use color::Color;
pub use config::{ParallelConfig, RetryPolicy, SearchLimits, SolverConfig};
pub use constraints::Constraints;
pub use location::{edge_between, Edge, Location};
pub use pair::{Pair, PairOptions, Pairs};
pub use path::{Path, Solution, Violation, TURN_COST};
pub use router::{default_order, order_score, SequentialRouter};
pub use search::PathSearch;
pub use session::{SolveEvent, SolveHandle};
pub use solver::{solve_both, OrderExplorer, Passes, SolveError};

pub mod board;
pub mod builder;
pub(crate) mod cell;
pub mod color;
pub mod config;
pub(crate) mod constraints;
pub mod location;
pub(crate) mod pair;
pub(crate) mod path;
pub(crate) mod router;
pub(crate) mod search;
pub(crate) mod session;
pub mod shape;
pub(crate) mod solver;
mod tests;
