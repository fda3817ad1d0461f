//! Solver settings.

use std::num::NonZero;
use std::thread;
use std::time::Duration;

/// How the [`OrderExplorer`](crate::OrderExplorer) retries after the default order fails.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum RetryPolicy {
    /// Walk every permutation of the colors, as long as there are no more than
    /// [`SolverConfig::exhaustive_limit`] of them.
    #[default]
    Permutations,
    /// Route once in the default order and report whatever happens.
    DefaultOrderOnly,
}

/// Budgets and pruning knobs for a single path search.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchLimits {
    /// Boards at most this wide are searched without bounding-box pruning.
    pub small_board: usize,
    /// Lower bound of the bounding-box margin.
    pub min_margin: usize,
    /// Pairs closer than this get the "near" budgets below.
    pub near_distance: usize,
    /// Iteration budget, as a multiple of `size²`, for near pairs.
    pub near_iteration_factor: usize,
    /// Iteration budget, as a multiple of `size²`, for everything else.
    pub far_iteration_factor: usize,
    /// Wall-clock limit of one search for near pairs.
    pub near_timeout: Duration,
    /// Wall-clock limit of one search for everything else.
    pub far_timeout: Duration,
    /// How many iterations pass between checks of the frontier bound.
    pub bound_check_interval: usize,
    /// The search stops once both frontiers' best estimates together exceed the best meeting
    /// cost by more than this percentage.
    pub bound_slack_percent: usize,
    /// Extra cost of a direction change when the turn penalty is on.
    pub turn_cost: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            small_board: 8,
            min_margin: 5,
            near_distance: 10,
            near_iteration_factor: 2,
            far_iteration_factor: 3,
            near_timeout: Duration::from_secs(5),
            far_timeout: Duration::from_secs(10),
            bound_check_interval: 100,
            bound_slack_percent: 10,
            turn_cost: 2,
        }
    }
}

impl SearchLimits {
    pub(crate) fn iteration_budget(&self, size: usize, distance: usize) -> usize {
        let factor = if distance < self.near_distance { self.near_iteration_factor } else { self.far_iteration_factor };
        factor * size * size
    }

    /// Whether frontiers whose best estimates sum to `estimate` can no longer come within the
    /// slack of a meeting costing `best`.
    pub(crate) fn past_bound(&self, estimate: usize, best: usize) -> bool {
        estimate.saturating_mul(100) > best.saturating_mul(100 + self.bound_slack_percent)
    }

    pub(crate) fn timeout(&self, distance: usize) -> Duration {
        if distance < self.near_distance { self.near_timeout } else { self.far_timeout }
    }
}

/// Worker pool settings for trying several orders at once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParallelConfig {
    /// Worker thread count.
    pub workers: usize,
    /// Orders pulled from the permutation sequence per round.
    pub batch_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, NonZero::get),
            batch_size: 64,
        }
    }
}

impl ParallelConfig {
    /// `workers` threads (at least one) with the default batch size.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            ..Default::default()
        }
    }

    /// Pull `batch_size` orders (at least one) per round.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// Everything a solve needs besides the board itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SolverConfig {
    /// Charge [`SearchLimits::turn_cost`] per direction change.
    pub turn_penalty: bool,
    /// What to do when there are few enough pairs to try other orders.
    pub retry: RetryPolicy,
    /// Above this many pairs, only the default order is tried.
    pub exhaustive_limit: usize,
    /// Budgets of every single search.
    pub limits: SearchLimits,
    /// Try orders on a worker pool instead of one after another.
    pub parallel: Option<ParallelConfig>,
    /// Seed for pairs that ask for randomized tie-breaking.
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            turn_penalty: false,
            retry: RetryPolicy::default(),
            exhaustive_limit: 8,
            limits: SearchLimits::default(),
            parallel: None,
            seed: 0,
        }
    }
}

impl SolverConfig {
    /// Set [`turn_penalty`](Self::turn_penalty).
    pub fn with_turn_penalty(mut self, turn_penalty: bool) -> Self {
        self.turn_penalty = turn_penalty;
        self
    }

    /// Set [`retry`](Self::retry).
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set [`limits`](Self::limits).
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Try orders on a worker pool.
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Set [`seed`](Self::seed).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
