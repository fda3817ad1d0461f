use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use itertools::Itertools;
use log::{debug, info};

use crate::board::Board;
use crate::color::Color;
use crate::config::SolverConfig;
use crate::constraints::Constraints;
use crate::pair::{Pair, Pairs};
use crate::path::Solution;
use crate::search::PathSearch;
use crate::solver::SolveError;

/// How constrained a pair is; lower scores are routed earlier, while the board is still empty.
///
/// `2 × distance − free(start) − free(end)`, where `free` counts the neighbors of an endpoint
/// that are not endpoints themselves.
pub fn order_score(board: &Board, pair: &Pair) -> isize {
    let distance = pair.distance() as isize;
    let free = (board.free_neighbors(pair.start) + board.free_neighbors(pair.end)) as isize;
    2 * distance - free
}

/// Colors in the order the router takes them when no order is given.
///
/// Pairs marked [`lead`](crate::PairOptions::lead) go first; the rest ascend by
/// [`order_score`], ties by color.
pub fn default_order(board: &Board, pairs: &Pairs) -> Vec<Color> {
    pairs.values()
        .sorted_by_key(|pair| (!pair.options.lead, order_score(board, pair), pair.color))
        .map(|pair| pair.color)
        .collect_vec()
}

/// Routes pairs one at a time in a fixed order, never revisiting a committed path.
///
/// Every call to [`route`](Self::route) starts from fresh [`Constraints`], so one router can
/// try any number of orders.
pub struct SequentialRouter<'a> {
    board: &'a Board,
    pairs: &'a Pairs,
    config: &'a SolverConfig,
    cancel: Vec<&'a AtomicBool>,
}

impl<'a> SequentialRouter<'a> {
    /// A router over `pairs` of `board`, searching as `config` says.
    pub fn new(board: &'a Board, pairs: &'a Pairs, config: &'a SolverConfig) -> Self {
        Self { board, pairs, config, cancel: Vec::new() }
    }

    /// Add a flag that stops routing once raised. Every flag added is polled.
    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel.push(cancel);
        self
    }

    /// Route in [`default_order`].
    pub fn route_default(&self) -> Result<Solution, SolveError> {
        self.route(&default_order(self.board, self.pairs))
    }

    /// Route every color of `order`, in that order.
    ///
    /// `order` must be a permutation of the board's colors; a missing, repeated or unknown color
    /// is reported as [`SolveError::Infeasible`] before anything is routed.
    /// Stops at the first color that cannot be connected and reports it the same way; nothing
    /// routed before it is kept.
    pub fn route(&self, order: &[Color]) -> Result<Solution, SolveError> {
        self.check_order(order)?;

        let started = Instant::now();
        let mut constraints = Constraints::from_pairs(self.pairs);
        let mut solution = Solution::default();

        for (index, color) in order.iter().enumerate() {
            let Some(pair) = self.pairs.get(color) else {
                return Err(SolveError::Infeasible { color: *color });
            };
            debug!("[{}/{}] routing color {}", index + 1, order.len(), color);

            let mut search = PathSearch::new(self.board, &constraints, &self.config.limits)
                .with_turn_penalty(self.config.turn_penalty)
                .with_seed(self.config.seed);
            for cancel in &self.cancel {
                search = search.with_cancel(cancel);
            }

            let path = match search.find(pair) {
                Ok(path) => path,
                Err(SolveError::Cancelled) => return Err(SolveError::Cancelled),
                Err(err) => {
                    debug!("{}", err);
                    return Err(SolveError::Infeasible { color: *color });
                }
            };
            if !path.connects(pair.start, pair.end) {
                return Err(SolveError::Infeasible { color: *color });
            }

            if self.config.turn_penalty {
                debug!(
                    "color {}: length {}, {} turns, cost {}",
                    color,
                    path.length(),
                    path.turns(),
                    path.cost_with(self.config.limits.turn_cost),
                );
            } else {
                debug!("color {}: length {}", color, path.length());
            }

            constraints.commit(&path);
            solution.insert(*color, path);
        }

        info!(
            "routed {} pairs over {} cells in {:?}",
            solution.len(),
            solution.cells_used(),
            started.elapsed(),
        );
        debug_assert!(solution.verify(self.pairs).is_ok());

        Ok(solution)
    }

    /// An order must name every pair exactly once; the first color that breaks this is reported.
    fn check_order(&self, order: &[Color]) -> Result<(), SolveError> {
        let mut seen = HashSet::with_capacity(order.len());
        if let Some(color) = order.iter().find(|color| !self.pairs.contains_key(*color) || !seen.insert(**color)) {
            return Err(SolveError::Infeasible { color: *color });
        }

        match self.pairs.keys().find(|color| !seen.contains(*color)) {
            Some(color) => Err(SolveError::Infeasible { color: *color }),
            None => Ok(()),
        }
    }
}
