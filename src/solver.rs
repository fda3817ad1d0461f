use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use itertools::Itertools;
use log::{info, trace, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use thiserror::Error;

use crate::board::{Board, PlacementError};
use crate::color::Color;
use crate::config::{ParallelConfig, RetryPolicy, SolverConfig};
use crate::pair::Pairs;
use crate::path::Solution;
use crate::router::SequentialRouter;

/// Reasons a solve may fail.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SolveError {
    /// The board's endpoints do not form valid pairs.
    #[error(transparent)]
    Placement(#[from] PlacementError),
    /// The search ran out of budget before connecting this color under the current constraints.
    #[error("no path found for color {color}")]
    PathNotFound {
        /// The color being searched.
        color: Color,
    },
    /// A routing order broke down at this color.
    #[error("routing stopped at color {color}")]
    Infeasible {
        /// The first color that could not be routed, or that the order names wrongly.
        color: Color,
    },
    /// Every order tried failed.
    #[error("none of the {tried} orders tried connects every pair")]
    NoFeasibleOrder {
        /// How many orders were routed.
        tried: usize,
    },
    /// The solve was cancelled before it finished.
    #[error("cancelled")]
    Cancelled,
}

/// Outcomes of the two scoring passes over one board.
#[derive(Clone, Debug)]
pub struct Passes {
    /// Paths scored by length alone.
    pub plain: Result<Solution, SolveError>,
    /// Paths scored with the turn penalty.
    pub turning: Result<Solution, SolveError>,
}

/// Searches over routing orders until one of them connects every pair.
///
/// With few enough pairs, every permutation of the colors is tried in lexicographic order and
/// the first complete [`Solution`] wins; otherwise only the default order is tried.
/// Permutations are generated lazily, one (or one batch) at a time.
pub struct OrderExplorer<'a> {
    board: &'a Board,
    pairs: Pairs,
    config: SolverConfig,
    cancel: Arc<AtomicBool>,
}

impl<'a> OrderExplorer<'a> {
    /// Validate the pairs of `board` and prepare to solve it.
    pub fn new(board: &'a Board, config: SolverConfig) -> Result<Self, SolveError> {
        Ok(Self {
            board,
            pairs: board.pairs()?,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Share `flag` as this explorer's cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// The flag polled by every search this explorer runs. Raising it makes a running solve
    /// return [`SolveError::Cancelled`]; it is never lowered again.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Raise the cancellation flag.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// The validated pairs being solved.
    pub fn pairs(&self) -> &Pairs {
        &self.pairs
    }

    fn router(&self) -> SequentialRouter<'_> {
        SequentialRouter::new(self.board, &self.pairs, &self.config).with_cancel(&self.cancel)
    }

    /// Whether every permutation will be tried.
    pub fn is_exhaustive(&self) -> bool {
        self.config.retry == RetryPolicy::Permutations && self.pairs.len() <= self.config.exhaustive_limit
    }

    /// Solve without reporting progress.
    pub fn solve(&self) -> Result<Solution, SolveError> {
        self.solve_with_progress(|_| {})
    }

    /// Solve, reporting the percentage of orders attempted so far to `progress`.
    ///
    /// Reported values never decrease and end at 100.
    pub fn solve_with_progress<F>(&self, mut progress: F) -> Result<Solution, SolveError>
    where
        F: FnMut(u8),
    {
        let started = Instant::now();
        let result = if self.pairs.is_empty() {
            Ok(Solution::default())
        } else if !self.is_exhaustive() {
            if self.config.retry == RetryPolicy::Permutations {
                warn!("{} pairs is too many to try every order; using the default order", self.pairs.len());
            }
            self.router().route_default()
        } else {
            match &self.config.parallel {
                None => self.explore(&mut progress),
                Some(parallel) => self.explore_parallel(parallel, &mut progress),
            }
        };
        progress(100);

        match &result {
            Ok(solution) => info!(
                "solved {} pairs in {:?}: {} cells used, total cost {}",
                solution.len(),
                started.elapsed(),
                solution.cells_used(),
                solution.total_cost(self.config.turn_penalty),
            ),
            Err(err) => info!("no solution after {:?}: {}", started.elapsed(), err),
        }

        result
    }

    fn colors(&self) -> Vec<Color> {
        self.pairs.keys().copied().collect_vec()
    }

    fn explore<F: FnMut(u8)>(&self, progress: &mut F) -> Result<Solution, SolveError> {
        let colors = self.colors();
        let total = permutation_count(colors.len());
        let router = self.router();
        let mut tried = 0;

        for order in colors.iter().copied().permutations(colors.len()) {
            progress(percent(tried, total));
            trace!("order {}/{}: {:?}", tried + 1, total, order);
            tried += 1;

            match router.route(&order) {
                Ok(solution) => return Ok(solution),
                Err(SolveError::Cancelled) => return Err(SolveError::Cancelled),
                Err(err) => trace!("order {:?} failed: {}", order, err),
            }
        }

        Err(SolveError::NoFeasibleOrder { tried })
    }

    fn explore_parallel<F: FnMut(u8)>(&self, parallel: &ParallelConfig, progress: &mut F) -> Result<Solution, SolveError> {
        let pool = match ThreadPoolBuilder::new().num_threads(parallel.workers).build() {
            Ok(pool) => pool,
            Err(err) => {
                warn!("could not start {} workers ({}); trying orders one at a time", parallel.workers, err);
                return self.explore(progress);
            }
        };

        let colors = self.colors();
        let total = permutation_count(colors.len());
        let mut orders = colors.iter().copied().permutations(colors.len());
        let mut tried = 0;

        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(SolveError::Cancelled);
            }
            let batch = orders.by_ref().take(parallel.batch_size).collect_vec();
            if batch.is_empty() {
                return Err(SolveError::NoFeasibleOrder { tried });
            }
            progress(percent(tried, total));

            // raised by the first order to succeed, so the rest of the batch stops expanding
            let found = AtomicBool::new(false);
            let solution = pool.install(|| {
                batch.par_iter().find_map_any(|order| {
                    let router = SequentialRouter::new(self.board, &self.pairs, &self.config)
                        .with_cancel(&self.cancel)
                        .with_cancel(&found);

                    match router.route(order) {
                        Ok(solution) => {
                            found.store(true, Ordering::Relaxed);
                            Some(solution)
                        }
                        Err(SolveError::Cancelled) => {
                            found.store(true, Ordering::Relaxed);
                            None
                        }
                        Err(err) => {
                            trace!("order {:?} failed: {}", order, err);
                            None
                        }
                    }
                })
            });

            tried += batch.len();
            if let Some(solution) = solution {
                return Ok(solution);
            }
        }
    }
}

/// Run the plain and the turn-penalty pass over `board`, in that order.
pub fn solve_both(board: &Board, config: &SolverConfig) -> Passes {
    let pass = |turn_penalty: bool| {
        OrderExplorer::new(board, config.clone().with_turn_penalty(turn_penalty))
            .and_then(|explorer| explorer.solve())
    };

    Passes {
        plain: pass(false),
        turning: pass(true),
    }
}

pub(crate) fn permutation_count(n: usize) -> usize {
    (1..=n).fold(1, usize::saturating_mul)
}

#[inline]
fn percent(done: usize, total: usize) -> u8 {
    (done.saturating_mul(100) / total.max(1)).min(100) as u8
}
