use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::iter;
use std::sync::atomic::{self, AtomicBool};
use std::time::Instant;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strum::VariantArray;

use crate::board::Board;
use crate::config::SearchLimits;
use crate::constraints::Constraints;
use crate::location::{edge_between, Location};
use crate::pair::Pair;
use crate::path::Path;
use crate::shape::{BoardShape, SquareStep};
use crate::solver::SolveError;

/// A search node: where we are and which way we moved to get here.
///
/// The heading is part of the state because the cost of the next step depends on it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct State {
    location: Location,
    heading: Option<SquareStep>,
}

/// Open set entry, reversed for min-heap order on `(f_score, jitter, counter)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct OpenEntry {
    f_score: usize,
    jitter: u32,
    counter: u64,
    state: State,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f_score.cmp(&self.f_score)
            .then_with(|| other.jitter.cmp(&self.jitter))
            .then_with(|| other.counter.cmp(&self.counter))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Inclusive rectangle a search may expand into.
#[derive(Clone, Copy, Debug)]
struct Bounds {
    min: Location,
    max: Location,
}

impl Bounds {
    fn everywhere(size: usize) -> Self {
        Self { min: Location(0, 0), max: Location(size - 1, size - 1) }
    }

    fn around(a: Location, b: Location, margin: usize, size: usize) -> Self {
        Self {
            min: Location(a.0.min(b.0).saturating_sub(margin), a.1.min(b.1).saturating_sub(margin)),
            max: Location((a.0.max(b.0) + margin).min(size - 1), (a.1.max(b.1) + margin).min(size - 1)),
        }
    }

    #[inline]
    fn contains(&self, location: Location) -> bool {
        (self.min.0..=self.max.0).contains(&location.0) && (self.min.1..=self.max.1).contains(&location.1)
    }
}

/// Read-only rules shared by both frontiers of one search.
struct Expansion<'s> {
    board: &'s Board,
    constraints: &'s Constraints,
    pair: &'s Pair,
    bounds: Bounds,
    turn_penalty: bool,
    turn_cost: usize,
}

impl Expansion<'_> {
    /// Manhattan distance, plus one turn if we are not already heading the way a straight run
    /// to `target` would start.
    fn heuristic(&self, location: Location, heading: Option<SquareStep>, target: Location) -> usize {
        let distance = location.distance(target);
        match (heading, SquareStep::toward(location, target)) {
            (Some(heading), Some(ideal)) if self.turn_penalty && heading != ideal => distance + self.turn_cost,
            _ => distance,
        }
    }

    fn step_cost(&self, heading: Option<SquareStep>, direction: SquareStep) -> usize {
        match heading {
            Some(heading) if self.turn_penalty && heading != direction => 1 + self.turn_cost,
            _ => 1,
        }
    }

    fn admits(&self, from: Location, to: Location) -> bool {
        self.board.connected(from, to)
            && self.bounds.contains(to)
            && self.constraints.cell_open_for(self.pair, to)
            && self.constraints.edge_open(&edge_between(from, to))
    }
}

/// A candidate meeting found by one frontier: its own state and the matching state of the other.
#[derive(Clone, Copy, Debug)]
struct Meeting {
    cost: usize,
    own: State,
    other: State,
}

/// Where the two searches joined up, oriented start to end.
#[derive(Clone, Copy, Debug)]
struct Junction {
    cost: usize,
    forward: State,
    backward: State,
}

/// One half of the bidirectional search, growing from `origin` toward `target`.
struct Frontier {
    origin: Location,
    target: Location,
    open: BinaryHeap<OpenEntry>,
    in_open: HashSet<State>,
    closed: HashSet<State>,
    g_scores: HashMap<State, usize>,
    parents: HashMap<State, State>,
    counter: u64,
}

impl Frontier {
    fn new(origin: Location, target: Location, expansion: &Expansion) -> Self {
        let mut frontier = Self {
            origin,
            target,
            open: BinaryHeap::new(),
            in_open: HashSet::new(),
            closed: HashSet::new(),
            g_scores: HashMap::new(),
            parents: HashMap::new(),
            counter: 0,
        };

        let state = State { location: origin, heading: None };
        frontier.g_scores.insert(state, 0);
        frontier.in_open.insert(state);
        frontier.push(state, expansion.heuristic(origin, None, target), 0);
        frontier
    }

    fn push(&mut self, state: State, f_score: usize, jitter: u32) {
        self.open.push(OpenEntry { f_score, jitter, counter: self.counter, state });
        self.counter += 1;
    }

    #[inline]
    fn is_exhausted(&self) -> bool {
        self.open.is_empty()
    }

    #[inline]
    fn min_f(&self) -> Option<usize> {
        self.open.peek().map(|entry| entry.f_score)
    }

    /// The cost of reaching `state`, if this frontier has seen it at all.
    fn reached(&self, state: &State) -> Option<usize> {
        if self.closed.contains(state) || self.in_open.contains(state) {
            self.g_scores.get(state).copied()
        } else {
            None
        }
    }

    /// Pop the most promising state, look for the other frontier at its cell, and expand it.
    ///
    /// Returns a meeting if one cheaper than `best` turned up.
    fn advance(&mut self, other: &Frontier, expansion: &Expansion, jitter: &mut Option<StdRng>, best: Option<usize>) -> Option<Meeting> {
        let entry = self.open.pop()?;
        let current = entry.state;
        self.in_open.remove(&current);
        if !self.closed.insert(current) {
            return None;
        }
        let g = *self.g_scores.get(&current)?;

        let mut met = None;
        let mut best = best;
        let headings = iter::once(None).chain(SquareStep::VARIANTS.iter().copied().map(Some));
        for heading in headings {
            let there = State { location: current.location, heading };
            if let Some(other_g) = other.reached(&there) {
                let cost = g + other_g;
                if best.map_or(true, |b| cost < b) {
                    best = Some(cost);
                    met = Some(Meeting { cost, own: current, other: there });
                }
            }
        }

        if best.is_some_and(|b| g > b) {
            return met;
        }

        for (direction, neighbor) in SquareStep::neighbors_of(current.location) {
            if !expansion.admits(current.location, neighbor) {
                continue;
            }

            let state = State { location: neighbor, heading: Some(direction) };
            if self.closed.contains(&state) {
                continue;
            }
            let tentative = g + expansion.step_cost(current.heading, direction);
            if self.g_scores.get(&state).is_some_and(|known| *known <= tentative) {
                continue;
            }

            self.parents.insert(state, current);
            self.g_scores.insert(state, tentative);
            if self.in_open.insert(state) {
                let f_score = tentative + expansion.heuristic(neighbor, state.heading, self.target);
                let jitter = jitter.as_mut().map_or(0, |rng| rng.gen());
                self.push(state, f_score, jitter);
            }
        }

        met
    }

    /// Cells from `from` back to this frontier's origin.
    fn trace(&self, from: State) -> Vec<Location> {
        let mut cells = vec![from.location];
        let mut state = from;
        while let Some(parent) = self.parents.get(&state) {
            cells.push(parent.location);
            state = *parent;
        }
        cells
    }
}

/// Insert straight runs between consecutive cells that are not adjacent, rows first like
/// [`SquareStep::toward`].
pub(crate) fn bridge_gaps(cells: Vec<Location>) -> Vec<Location> {
    let mut bridged: Vec<Location> = Vec::with_capacity(cells.len());

    for cell in cells {
        let Some(mut at) = bridged.last().copied().filter(|previous| previous.distance(cell) > 1) else {
            bridged.push(cell);
            continue;
        };

        while at.1 != cell.1 {
            at = Location(at.0, if at.1 < cell.1 { at.1 + 1 } else { at.1 - 1 });
            bridged.push(at);
        }
        while at.0 != cell.0 {
            at = Location(if at.0 < cell.0 { at.0 + 1 } else { at.0 - 1 }, at.1);
            bridged.push(at);
        }
    }

    bridged
}

/// Bidirectional, turn-aware A* for one pair under the current [`Constraints`].
///
/// Both halves of the search run the same expansion step, one from each endpoint, and
/// meet somewhere in between. The heuristic charges for at most one expected turn, which makes
/// it inadmissible once the turn penalty is on; paths are short, not necessarily shortest.
pub struct PathSearch<'a> {
    board: &'a Board,
    constraints: &'a Constraints,
    limits: &'a SearchLimits,
    turn_penalty: bool,
    seed: u64,
    cancel: Vec<&'a AtomicBool>,
}

impl<'a> PathSearch<'a> {
    /// A search on `board` that respects `constraints` and stays within `limits`.
    pub fn new(board: &'a Board, constraints: &'a Constraints, limits: &'a SearchLimits) -> Self {
        Self {
            board,
            constraints,
            limits,
            turn_penalty: false,
            seed: 0,
            cancel: Vec::new(),
        }
    }

    /// Charge for direction changes.
    pub fn with_turn_penalty(mut self, turn_penalty: bool) -> Self {
        self.turn_penalty = turn_penalty;
        self
    }

    /// Seed for pairs with [`jitter`](crate::PairOptions::jitter) set.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Stop expanding as soon as `cancel` is raised. May be called more than once; any raised
    /// flag stops the search.
    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel.push(cancel);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.iter().any(|flag| flag.load(atomic::Ordering::Relaxed))
    }

    fn bounds_for(&self, pair: &Pair) -> Bounds {
        let size = self.board.size();
        if size <= self.limits.small_board || pair.options.unbounded {
            return Bounds::everywhere(size);
        }

        let margin = pair.distance().max(self.limits.min_margin).min(size / 2);
        Bounds::around(pair.start, pair.end, margin, size)
    }

    /// Find a path connecting the endpoints of `pair`.
    ///
    /// Fails with [`SolveError::PathNotFound`] when the budget runs out before the two frontiers
    /// meet or the assembled path is malformed, and with [`SolveError::Cancelled`] when the
    /// cancellation flag is raised mid-search.
    pub fn find(&self, pair: &Pair) -> Result<Path, SolveError> {
        let not_found = SolveError::PathNotFound { color: pair.color };
        let (start, end) = (pair.start, pair.end);
        let size = self.board.size();

        if !start.within(size) || !end.within(size) {
            return Err(not_found);
        }
        if start == end {
            return Ok(Path::new(vec![start]));
        }
        let distance = start.distance(end);
        if distance == 1 {
            return Ok(Path::new(vec![start, end]));
        }

        let expansion = Expansion {
            board: self.board,
            constraints: self.constraints,
            pair,
            bounds: self.bounds_for(pair),
            turn_penalty: self.turn_penalty,
            turn_cost: self.limits.turn_cost,
        };
        let mut jitter = pair.options.jitter.then(|| StdRng::seed_from_u64(self.seed ^ pair.color.get() as u64));

        let mut forward = Frontier::new(start, end, &expansion);
        let mut backward = Frontier::new(end, start, &expansion);
        let mut junction: Option<Junction> = None;

        let budget = self.limits.iteration_budget(size, distance);
        let timeout = self.limits.timeout(distance);
        let started = Instant::now();
        let mut iterations = 0;

        while !forward.is_exhausted() && !backward.is_exhausted() {
            iterations += 1;
            if self.cancelled() {
                return Err(SolveError::Cancelled);
            }
            if iterations > budget {
                if junction.is_none() {
                    warn!("color {}: no meeting within {} iterations", pair.color, budget);
                }
                break;
            }
            if started.elapsed() >= timeout {
                warn!("color {}: search timed out after {:?}", pair.color, timeout);
                break;
            }

            let best = junction.map(|j| j.cost);
            if let Some(met) = forward.advance(&backward, &expansion, &mut jitter, best) {
                junction = Some(Junction { cost: met.cost, forward: met.own, backward: met.other });
            }
            let best = junction.map(|j| j.cost);
            if let Some(met) = backward.advance(&forward, &expansion, &mut jitter, best) {
                junction = Some(Junction { cost: met.cost, forward: met.other, backward: met.own });
            }

            if let Some(junction) = junction {
                if iterations % self.limits.bound_check_interval.max(1) == 0 {
                    if let (Some(f), Some(b)) = (forward.min_f(), backward.min_f()) {
                        if self.limits.past_bound(f + b, junction.cost) {
                            break;
                        }
                    }
                }
            }
        }

        debug!(
            "color {}: {} iterations, {} forward / {} backward states closed, {:?}",
            pair.color,
            iterations,
            forward.closed.len(),
            backward.closed.len(),
            started.elapsed(),
        );

        let Some(junction) = junction else {
            return Err(not_found);
        };
        let path = Path::new(self.assemble(&forward, &backward, junction));
        if !path.connects(start, end) {
            warn!("color {}: discarding malformed path {:?}", pair.color, path.cells());
            return Err(not_found);
        }

        Ok(path)
    }

    fn assemble(&self, forward: &Frontier, backward: &Frontier, junction: Junction) -> Vec<Location> {
        debug_assert_eq!(forward.origin, backward.target);

        let mut cells = forward.trace(junction.forward);
        cells.reverse();
        // the backward trace starts on the meeting cell, which the forward half already ends on
        cells.extend(backward.trace(junction.backward).into_iter().skip(1));

        bridge_gaps(cells)
    }
}
