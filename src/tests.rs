#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::num::NonZero;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    use rstest::rstest;

    use crate::board::{print, validate, Board, Duplicate, PlacementError};
    use crate::builder::BoardBuilder;
    use crate::color::{glyph, Color};
    use crate::config::{ParallelConfig, RetryPolicy, SearchLimits, SolverConfig};
    use crate::constraints::Constraints;
    use crate::location::{edge_between, Location};
    use crate::pair::{Pair, PairOptions};
    use crate::path::{Path, Solution, Violation};
    use crate::router::{default_order, order_score, SequentialRouter};
    use crate::search::{bridge_gaps, PathSearch};
    use crate::session::{SolveEvent, SolveHandle};
    use crate::shape::SquareStep;
    use crate::solver::{permutation_count, solve_both, OrderExplorer, SolveError};

    fn color(n: usize) -> Color {
        NonZero::new(n).unwrap()
    }

    fn board_of(size: usize, pairs: &[(usize, (Location, Location))]) -> Board {
        let mut builder = BoardBuilder::with_size(NonZero::new(size).unwrap());
        for (n, locations) in pairs {
            builder.add_pair(color(*n), *locations);
        }
        builder.build().unwrap()
    }

    /// The three-pair board shown on startup.
    fn three_pairs() -> Board {
        board_of(8, &[
            (1, (Location(0, 0), Location(3, 3))),
            (2, (Location(1, 1), Location(2, 3))),
            (3, (Location(2, 2), Location(3, 0))),
        ])
    }

    /// Two pairs that can only connect through the same center cell.
    fn contested_center() -> Board {
        board_of(3, &[
            (1, (Location(0, 1), Location(2, 1))),
            (2, (Location(1, 0), Location(1, 2))),
        ])
    }

    fn path(cells: &[(usize, usize)]) -> Path {
        Path::new(cells.iter().map(|(x, y)| Location(*x, *y)).collect())
    }

    /// Corner-to-corner pairs on a board big enough that exhausting the search takes a while.
    fn wide_open() -> Board {
        board_of(300, &[
            (1, (Location(0, 0), Location(299, 299))),
            (2, (Location(0, 299), Location(299, 0))),
        ])
    }

    /// Limits that let a search run until a frontier is exhausted.
    fn unhurried() -> SearchLimits {
        SearchLimits {
            near_iteration_factor: 100,
            far_iteration_factor: 100,
            near_timeout: Duration::from_secs(600),
            far_timeout: Duration::from_secs(600),
            bound_check_interval: usize::MAX,
            ..Default::default()
        }
    }

    fn find(board: &Board, pair: &Pair) -> Result<Path, SolveError> {
        let constraints = Constraints::from_pairs(&board.pairs().unwrap());
        let limits = SearchLimits::default();
        PathSearch::new(board, &constraints, &limits).find(pair)
    }

    #[test]
    fn remove_pair() {
        let board = BoardBuilder::with_size(NonZero::new(5).unwrap())
            .add_pair(color(1), (Location(0, 0), Location(1, 4)))
            .pop_pair()
            .build()
            .unwrap();

        assert_eq!(format!("{}", board), ".....
.....
.....
.....
.....
");
    }

    #[test]
    fn display_endpoints() {
        let board = board_of(5, &[
            (1, (Location(0, 0), Location(1, 4))),
            (2, (Location(2, 0), Location(1, 3))),
            (12, (Location(4, 2), Location(4, 4))),
        ]);

        assert_eq!(format!("{}", board), "1.2..
.....
....C
.2...
.1..C
");
    }

    #[rstest]
    #[case(1, '1')]
    #[case(9, '9')]
    #[case(10, 'A')]
    #[case(35, 'Z')]
    #[case(36, '#')]
    fn color_glyphs(#[case] n: usize, #[case] expected: char) {
        assert_eq!(glyph(color(n)), expected);
    }

    #[test]
    fn place_rejects_bad_endpoints() {
        let mut board = Board::new(NonZero::new(5).unwrap());

        assert_eq!(
            board.place(color(1), Location(5, 0)),
            Err(PlacementError::OutOfBounds { location: Location(5, 0) })
        );

        board.place(color(1), Location(0, 0)).unwrap();
        assert_eq!(
            board.place(color(2), Location(0, 0)),
            Err(PlacementError::DuplicatePlacement { color: color(2), reason: Duplicate::Overlap(Location(0, 0)) })
        );

        board.place(color(1), Location(1, 0)).unwrap();
        assert_eq!(
            board.place(color(1), Location(2, 0)),
            Err(PlacementError::DuplicatePlacement { color: color(1), reason: Duplicate::EndpointCount(3) })
        );
    }

    #[test]
    fn lone_endpoint_is_not_a_pair() {
        let mut board = Board::new(NonZero::new(4).unwrap());
        board.place(color(3), Location(1, 1)).unwrap();

        let expected = PlacementError::DuplicatePlacement { color: color(3), reason: Duplicate::EndpointCount(1) };
        assert_eq!(board.pairs(), Err(expected));
        assert_eq!(
            OrderExplorer::new(&board, SolverConfig::default()).err(),
            Some(SolveError::Placement(expected))
        );
    }

    #[test]
    fn remove_single_endpoint() {
        let mut board = board_of(4, &[(1, (Location(0, 0), Location(3, 3)))]);

        assert_eq!(board.remove(Location(3, 3)), Some(color(1)));
        assert_eq!(board.remove(Location(3, 3)), None);
        assert!(board.pairs().is_err());
        assert_eq!(board.remove(Location(0, 0)), Some(color(1)));
        assert_eq!(board.colors().count(), 0);
        assert!(!board.remove_pair(color(1)));
    }

    #[test]
    fn validate_endpoint_lists() {
        let mut pairs = BTreeMap::new();
        pairs.insert(color(1), vec![Location(0, 0), Location(3, 3)]);
        assert_eq!(validate(4, &pairs), Ok(()));

        pairs.insert(color(2), vec![Location(1, 1)]);
        assert_eq!(
            validate(4, &pairs),
            Err(PlacementError::DuplicatePlacement { color: color(2), reason: Duplicate::EndpointCount(1) })
        );

        pairs.insert(color(2), vec![Location(1, 1), Location(4, 1)]);
        assert_eq!(validate(4, &pairs), Err(PlacementError::OutOfBounds { location: Location(4, 1) }));

        pairs.insert(color(2), vec![Location(1, 1), Location(3, 3)]);
        assert_eq!(
            validate(4, &pairs),
            Err(PlacementError::DuplicatePlacement { color: color(2), reason: Duplicate::Overlap(Location(3, 3)) })
        );
    }

    #[test]
    fn builder_keeps_first_failure() {
        let mut builder = BoardBuilder::default();
        builder
            .add_pair(color(1), (Location(0, 0), Location(9, 9)))
            .add_pair(color(2), (Location(1, 1), Location(2, 2)))
            .pop_pair();

        let expected = PlacementError::OutOfBounds { location: Location(9, 9) };
        assert_eq!(builder.invalid_reason(), Some(&expected));
        assert_eq!(builder.build().err(), Some(expected));
    }

    #[test]
    fn builder_from_pairs() {
        let mut pairs = BTreeMap::new();
        pairs.insert(color(1), (Location(0, 0), Location(2, 0)));
        pairs.insert(color(2), (Location(0, 2), Location(2, 2)));

        let board = BoardBuilder::from_pairs(NonZero::new(3).unwrap(), &pairs).unwrap();
        assert_eq!(format!("{}", board), "1.1
...
2.2
");

        pairs.insert(color(3), (Location(2, 2), Location(1, 1)));
        assert!(BoardBuilder::from_pairs(NonZero::new(3).unwrap(), &pairs).is_err());
    }

    #[test]
    fn random_boards_are_reproducible() {
        let size = NonZero::new(8).unwrap();
        let a = BoardBuilder::random(size, 5, 42);
        let b = BoardBuilder::random(size, 5, 42);

        assert_eq!(format!("{}", a), format!("{}", b));
        assert_eq!(a.pairs().unwrap().len(), 5);

        // only two pairs fit on a 2×2 board
        let crowded = BoardBuilder::random(NonZero::new(2).unwrap(), 5, 7);
        assert_eq!(crowded.pairs().unwrap().len(), 2);
    }

    #[test]
    fn free_neighbors() {
        let board = board_of(3, &[(1, (Location(0, 0), Location(1, 0)))]);

        assert_eq!(board.free_neighbors(Location(0, 0)), 1);
        assert_eq!(board.free_neighbors(Location(1, 1)), 3);
        assert_eq!(board.free_neighbors(Location(2, 2)), 2);
        assert_eq!(board.free_neighbors(Location(3, 2)), 0);
        assert!(board.connected(Location(2, 1), Location(1, 1)));
        assert!(!board.connected(Location(2, 1), Location(0, 1)));
    }

    #[rstest]
    #[case(&[(0, 0)], 0, 0, 0)]
    #[case(&[(0, 0), (1, 0), (2, 0)], 0, 2, 2)]
    #[case(&[(0, 0), (1, 0), (1, 1)], 1, 2, 4)]
    #[case(&[(0, 0), (1, 0), (1, 1), (2, 1), (2, 2)], 3, 4, 10)]
    fn path_cost(#[case] cells: &[(usize, usize)], #[case] turns: usize, #[case] plain: usize, #[case] turning: usize) {
        let path = path(cells);

        assert_eq!(path.turns(), turns);
        assert_eq!(path.cost(false), plain);
        assert_eq!(path.cost(false), path.length());
        assert_eq!(path.cost(true), turning);
    }

    #[test]
    fn path_shape() {
        let straight = path(&[(0, 0), (1, 0), (2, 0)]);
        assert!(straight.connects(Location(0, 0), Location(2, 0)));
        assert!(!straight.connects(Location(2, 0), Location(0, 0)));
        assert_eq!(straight.interior(), &[Location(1, 0)]);
        assert_eq!(straight.edges().count(), 2);

        assert!(!path(&[(0, 0), (2, 0)]).connects(Location(0, 0), Location(2, 0)));
        assert!(!path(&[(0, 0), (1, 0), (0, 0), (1, 0)]).connects(Location(0, 0), Location(1, 0)));
    }

    #[test]
    fn edges_are_canonical() {
        let a = Location(2, 1);
        let b = Location(2, 2);

        assert_eq!(edge_between(a, b), edge_between(b, a));
        assert_eq!(edge_between(b, a).0, a);
    }

    #[rstest]
    #[case((1, 1), (1, 0), Some(SquareStep::Up))]
    #[case((1, 1), (0, 3), Some(SquareStep::Down))]
    #[case((1, 1), (3, 1), Some(SquareStep::Right))]
    #[case((1, 1), (0, 1), Some(SquareStep::Left))]
    #[case((1, 1), (1, 1), None)]
    fn straight_run_heading(#[case] from: (usize, usize), #[case] to: (usize, usize), #[case] expected: Option<SquareStep>) {
        assert_eq!(SquareStep::toward(Location(from.0, from.1), Location(to.0, to.1)), expected);
    }

    #[test]
    fn bridge_missing_steps() {
        // rows first, the same way `toward` picks a heading
        let bridged = bridge_gaps(vec![Location(0, 0), Location(2, 1), Location(2, 2)]);
        assert_eq!(bridged, vec![Location(0, 0), Location(0, 1), Location(1, 1), Location(2, 1), Location(2, 2)]);
        assert_eq!(SquareStep::toward(Location(0, 0), Location(2, 1)), Some(SquareStep::Down));
    }

    #[test]
    fn constraints_block_committed_paths() {
        let board = board_of(4, &[
            (1, (Location(0, 0), Location(2, 0))),
            (2, (Location(0, 1), Location(3, 3))),
        ]);
        let pairs = board.pairs().unwrap();
        let (first, second) = (pairs[&color(1)], pairs[&color(2)]);
        let mut constraints = Constraints::from_pairs(&pairs);

        assert!(constraints.cell_open_for(&first, Location(0, 0)));
        assert!(!constraints.cell_open_for(&first, Location(0, 1)));
        assert!(constraints.cell_open_for(&second, Location(1, 0)));

        constraints.commit(&path(&[(0, 0), (1, 0), (2, 0)]));
        assert!(!constraints.cell_open_for(&second, Location(1, 0)));
        assert!(!constraints.edge_open(&edge_between(Location(1, 0), Location(0, 0))));
        assert_eq!(constraints.blocked_edges().len(), 2);
        assert_eq!(constraints.blocked_cells().len(), 5);
    }

    #[test]
    fn trivial_searches() {
        let board = board_of(4, &[(1, (Location(1, 1), Location(2, 1)))]);
        let pairs = board.pairs().unwrap();
        let pair = pairs[&color(1)];

        // an edge used by someone else does not stop a pair of neighbors
        let mut constraints = Constraints::from_pairs(&pairs);
        constraints.commit(&path(&[(1, 0), (1, 1), (2, 1), (2, 2)]));
        let limits = SearchLimits::default();
        let found = PathSearch::new(&board, &constraints, &limits).find(&pair).unwrap();
        assert_eq!(found.cells(), &[Location(1, 1), Location(2, 1)]);

        let same = Pair::new(color(2), (Location(3, 3), Location(3, 3)));
        assert_eq!(find(&board, &same).unwrap().cells(), &[Location(3, 3)]);

        let outside = Pair::new(color(2), (Location(0, 0), Location(4, 0)));
        assert_eq!(find(&board, &outside), Err(SolveError::PathNotFound { color: color(2) }));
    }

    #[test]
    fn single_pair_takes_shortest_path() {
        let board = board_of(4, &[(1, (Location(0, 0), Location(3, 3)))]);
        let pair = board.pairs().unwrap()[&color(1)];

        let found = find(&board, &pair).unwrap();
        assert!(found.connects(Location(0, 0), Location(3, 3)));
        assert_eq!(found.length(), 6);
    }

    #[test]
    fn straight_line_has_no_turns() {
        let board = board_of(8, &[(1, (Location(0, 3), Location(6, 3)))]);
        let pairs = board.pairs().unwrap();
        let constraints = Constraints::from_pairs(&pairs);
        let limits = SearchLimits::default();

        let found = PathSearch::new(&board, &constraints, &limits)
            .with_turn_penalty(true)
            .find(&pairs[&color(1)])
            .unwrap();
        assert_eq!(found.length(), 6);
        assert_eq!(found.turns(), 0);
    }

    #[test]
    fn search_goes_around_taken_cells() {
        let board = board_of(3, &[(1, (Location(0, 0), Location(2, 0)))]);
        let pairs = board.pairs().unwrap();
        let limits = SearchLimits::default();

        let mut constraints = Constraints::from_pairs(&pairs);
        constraints.commit(&path(&[(2, 2), (1, 0), (1, 2)]));

        let found = PathSearch::new(&board, &constraints, &limits).find(&pairs[&color(1)]).unwrap();
        assert_eq!(found.cells(), &[Location(0, 0), Location(0, 1), Location(1, 1), Location(2, 1), Location(2, 0)]);
    }

    #[test]
    fn neighbors_connect_whatever_is_blocked() {
        let board = board_of(3, &[(1, (Location(1, 1), Location(1, 2)))]);
        let pairs = board.pairs().unwrap();
        let limits = SearchLimits {
            near_iteration_factor: 0,
            near_timeout: Duration::ZERO,
            ..Default::default()
        };

        let mut constraints = Constraints::from_pairs(&pairs);
        constraints.commit(&path(&[(0, 1), (1, 1), (1, 2), (2, 2)]));

        let found = PathSearch::new(&board, &constraints, &limits).find(&pairs[&color(1)]).unwrap();
        assert_eq!(found.cells(), &[Location(1, 1), Location(1, 2)]);
    }

    #[test]
    fn iteration_budget_exhausted() {
        let board = board_of(4, &[(1, (Location(0, 0), Location(3, 3)))]);
        let pairs = board.pairs().unwrap();
        let limits = SearchLimits { near_iteration_factor: 0, ..Default::default() };
        let constraints = Constraints::from_pairs(&pairs);

        assert_eq!(
            PathSearch::new(&board, &constraints, &limits).find(&pairs[&color(1)]),
            Err(SolveError::PathNotFound { color: color(1) })
        );

        let config = SolverConfig::default().with_limits(limits);
        let router = SequentialRouter::new(&board, &pairs, &config);
        assert_eq!(router.route_default(), Err(SolveError::Infeasible { color: color(1) }));
    }

    #[test]
    fn search_timeout() {
        let board = board_of(4, &[(1, (Location(0, 0), Location(3, 3)))]);
        let pairs = board.pairs().unwrap();
        let limits = SearchLimits { near_timeout: Duration::ZERO, ..Default::default() };
        let constraints = Constraints::from_pairs(&pairs);

        assert_eq!(
            PathSearch::new(&board, &constraints, &limits).find(&pairs[&color(1)]),
            Err(SolveError::PathNotFound { color: color(1) })
        );
    }

    #[rstest]
    #[case(12, 11, false)]
    #[case(12, 10, true)]
    #[case(11, 10, false)]
    #[case(usize::MAX, 10, true)]
    fn frontier_bound(#[case] estimate: usize, #[case] best: usize, #[case] expected: bool) {
        assert_eq!(SearchLimits::default().past_bound(estimate, best), expected);
    }

    #[test]
    fn bound_check_every_iteration() {
        let board = board_of(8, &[(1, (Location(0, 0), Location(5, 5)))]);
        let pairs = board.pairs().unwrap();
        let limits = SearchLimits { bound_check_interval: 1, bound_slack_percent: 0, ..Default::default() };
        let constraints = Constraints::from_pairs(&pairs);

        let found = PathSearch::new(&board, &constraints, &limits).find(&pairs[&color(1)]).unwrap();
        assert!(found.connects(Location(0, 0), Location(5, 5)));
        assert_eq!(found.length(), 10);
    }

    #[test]
    fn cancel_running_search() {
        let board = wide_open();
        let pairs = board.pairs().unwrap();
        let limits = unhurried();
        let constraints = Constraints::from_pairs(&pairs);
        let cancel = AtomicBool::new(false);

        let result = thread::scope(|scope| {
            scope.spawn(|| {
                thread::sleep(Duration::from_millis(10));
                cancel.store(true, Ordering::Relaxed);
            });
            PathSearch::new(&board, &constraints, &limits).with_cancel(&cancel).find(&pairs[&color(1)])
        });
        assert_eq!(result, Err(SolveError::Cancelled));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(ParallelConfig::new(2).with_batch_size(2)))]
    fn cancel_running_explorer(#[case] parallel: Option<ParallelConfig>) {
        let board = wide_open();
        let config = SolverConfig { parallel, ..SolverConfig::default().with_limits(unhurried()) };
        let explorer = OrderExplorer::new(&board, config).unwrap();

        let result = thread::scope(|scope| {
            scope.spawn(|| {
                thread::sleep(Duration::from_millis(10));
                explorer.cancel();
            });
            explorer.solve()
        });
        assert_eq!(result, Err(SolveError::Cancelled));
    }

    #[test]
    fn unbounded_pairs_escape_the_bounding_box() {
        let board = board_of(20, &[(1, (Location(0, 0), Location(2, 0)))]);
        let pairs = board.pairs().unwrap();
        let limits = SearchLimits::default();

        // a fence at x = 1 reaching past the box around the pair
        let mut constraints = Constraints::from_pairs(&pairs);
        let mut fence = vec![(19, 19)];
        fence.extend((0..=6).map(|y| (1, y)));
        fence.push((19, 17));
        constraints.commit(&path(&fence));

        let bounded = pairs[&color(1)];
        assert_eq!(
            PathSearch::new(&board, &constraints, &limits).find(&bounded),
            Err(SolveError::PathNotFound { color: color(1) })
        );

        let unbounded = bounded.with_options(PairOptions { unbounded: true, ..Default::default() });
        let found = PathSearch::new(&board, &constraints, &limits).find(&unbounded).unwrap();
        assert!(found.connects(Location(0, 0), Location(2, 0)));
        assert!(found.cells().iter().any(|cell| cell.1 >= 7));
        assert!(found.cells().iter().all(|cell| cell.0 != 1 || cell.1 > 6));
    }

    #[test]
    fn jitter_is_reproducible() {
        let board = board_of(8, &[(1, (Location(0, 0), Location(5, 5)))]);
        let pairs = board.pairs().unwrap();
        let pair = pairs[&color(1)].with_options(PairOptions { jitter: true, ..Default::default() });
        let constraints = Constraints::from_pairs(&pairs);
        let limits = SearchLimits::default();

        let first = PathSearch::new(&board, &constraints, &limits).with_seed(9).find(&pair).unwrap();
        let second = PathSearch::new(&board, &constraints, &limits).with_seed(9).find(&pair).unwrap();
        assert!(first.connects(Location(0, 0), Location(5, 5)));
        assert_eq!(first, second);
    }

    #[test]
    fn verify_catches_shared_edges_and_cells() {
        let board = board_of(3, &[
            (1, (Location(0, 0), Location(1, 2))),
            (2, (Location(2, 0), Location(2, 1))),
        ]);
        let pairs = board.pairs().unwrap();

        let mut solution = Solution::default();
        solution.insert(color(1), path(&[(0, 0), (1, 0), (1, 1), (1, 2)]));
        assert_eq!(solution.verify(&pairs), Err(Violation::Missing { color: color(2) }));

        solution.insert(color(2), path(&[(2, 0), (1, 0), (1, 1), (2, 1)]));
        assert_eq!(
            solution.verify(&pairs),
            Err(Violation::SharedEdge {
                first: color(1),
                second: color(2),
                edge: edge_between(Location(1, 0), Location(1, 1)),
            })
        );

        let crossing = board_of(3, &[
            (1, (Location(0, 1), Location(2, 1))),
            (2, (Location(1, 0), Location(1, 2))),
        ]);
        let mut solution = Solution::default();
        solution.insert(color(1), path(&[(0, 1), (1, 1), (2, 1)]));
        solution.insert(color(2), path(&[(1, 0), (1, 1), (1, 2)]));
        assert_eq!(
            solution.verify(&crossing.pairs().unwrap()),
            Err(Violation::SharedCell { first: color(1), second: color(2), location: Location(1, 1) })
        );

        solution.insert(color(2), path(&[(1, 0), (0, 0)]));
        assert_eq!(solution.verify(&crossing.pairs().unwrap()), Err(Violation::Broken { color: color(2) }));
    }

    #[test]
    fn order_scores() {
        let board = three_pairs();
        let pairs = board.pairs().unwrap();

        assert_eq!(order_score(&board, &pairs[&color(1)]), 7);
        assert_eq!(order_score(&board, &pairs[&color(2)]), 0);
        assert_eq!(order_score(&board, &pairs[&color(3)]), 0);
        assert_eq!(default_order(&board, &pairs), vec![color(2), color(3), color(1)]);
    }

    #[test]
    fn lead_pairs_go_first() {
        let mut board = three_pairs();
        board.configure(color(1), PairOptions { lead: true, ..Default::default() });
        let pairs = board.pairs().unwrap();

        assert!(pairs[&color(1)].options.lead);
        assert_eq!(default_order(&board, &pairs), vec![color(1), color(2), color(3)]);
    }

    #[test]
    fn route_straight_line() {
        let board = board_of(3, &[(1, (Location(0, 0), Location(2, 0)))]);
        let solution = OrderExplorer::new(&board, SolverConfig::default()).unwrap().solve().unwrap();

        assert_eq!(print(&board.render(Some(&solution))), "111
...
...
");
    }

    #[test]
    fn route_single_pair_render() {
        let board = board_of(4, &[(1, (Location(0, 0), Location(3, 3)))]);
        let solution = OrderExplorer::new(&board, SolverConfig::default()).unwrap().solve().unwrap();

        let rendered = board.render(Some(&solution));
        assert_eq!(rendered.iter().filter(|c| **c == '1').count(), 7);
        assert_eq!(rendered.iter().filter(|c| **c == '.').count(), 9);
    }

    #[test]
    fn solve_three_pairs() {
        let board = three_pairs();
        let explorer = OrderExplorer::new(&board, SolverConfig::default()).unwrap();
        assert!(explorer.is_exhaustive());

        let mut progress = Vec::new();
        let solution = explorer.solve_with_progress(|percent| progress.push(percent)).unwrap();

        assert_eq!(solution.len(), 3);
        assert_eq!(solution.verify(explorer.pairs()), Ok(()));
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.last(), Some(&100));
    }

    #[test]
    fn orders_must_name_every_pair_once() {
        let board = three_pairs();
        let pairs = board.pairs().unwrap();
        let config = SolverConfig::default();
        let router = SequentialRouter::new(&board, &pairs, &config);

        assert_eq!(router.route(&[color(1)]), Err(SolveError::Infeasible { color: color(2) }));
        assert_eq!(router.route(&[color(1), color(1), color(2)]), Err(SolveError::Infeasible { color: color(1) }));
        assert_eq!(router.route(&[]), Err(SolveError::Infeasible { color: color(1) }));

        let solution = router.route(&default_order(&board, &pairs)).unwrap();
        assert_eq!(solution.verify(&pairs), Ok(()));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(3, 6)]
    #[case(8, 40320)]
    #[case(25, usize::MAX)]
    fn permutation_counts(#[case] n: usize, #[case] expected: usize) {
        assert_eq!(permutation_count(n), expected);
    }

    #[test]
    fn route_detour_around_crossing() {
        let board = board_of(5, &[
            (1, (Location(1, 2), Location(3, 2))),
            (2, (Location(2, 1), Location(2, 3))),
        ]);
        let explorer = OrderExplorer::new(&board, SolverConfig::default()).unwrap();

        let solution = explorer.solve().unwrap();
        assert_eq!(solution.verify(explorer.pairs()), Ok(()));
        assert!(solution.iter().any(|(_, path)| path.length() > 2));
    }

    #[test]
    fn contested_cell_is_infeasible() {
        let board = contested_center();
        let pairs = board.pairs().unwrap();
        let config = SolverConfig::default();

        let router = SequentialRouter::new(&board, &pairs, &config);
        assert_eq!(router.route(&[color(1), color(2)]), Err(SolveError::Infeasible { color: color(2) }));
        assert_eq!(router.route(&[color(2), color(1)]), Err(SolveError::Infeasible { color: color(1) }));
        assert_eq!(router.route(&[color(4)]), Err(SolveError::Infeasible { color: color(4) }));

        let mut progress = Vec::new();
        let explorer = OrderExplorer::new(&board, config).unwrap();
        assert_eq!(
            explorer.solve_with_progress(|percent| progress.push(percent)),
            Err(SolveError::NoFeasibleOrder { tried: 2 })
        );
        assert_eq!(progress, vec![0, 50, 100]);
    }

    #[test]
    fn interleaved_border_pairs_never_cross() {
        let board = board_of(5, &[
            (1, (Location(0, 2), Location(4, 2))),
            (2, (Location(2, 0), Location(2, 4))),
        ]);

        let result = OrderExplorer::new(&board, SolverConfig::default()).unwrap().solve();
        assert_eq!(result, Err(SolveError::NoFeasibleOrder { tried: 2 }));
    }

    #[test]
    fn default_order_only() {
        let config = SolverConfig::default().with_retry(RetryPolicy::DefaultOrderOnly);
        let board = contested_center();
        let explorer = OrderExplorer::new(&board, config).unwrap();

        assert!(!explorer.is_exhaustive());
        assert_eq!(explorer.solve(), Err(SolveError::Infeasible { color: color(2) }));
    }

    #[test]
    fn too_many_pairs_for_permutations() {
        let board = BoardBuilder::random(NonZero::new(8).unwrap(), 9, 3);
        let explorer = OrderExplorer::new(&board, SolverConfig::default()).unwrap();
        assert!(!explorer.is_exhaustive());

        match explorer.solve() {
            Ok(solution) => assert_eq!(solution.verify(explorer.pairs()), Ok(())),
            Err(err) => assert!(matches!(err, SolveError::Infeasible { .. })),
        }
    }

    #[test]
    fn empty_board_solves_trivially() {
        let board = Board::new(NonZero::new(4).unwrap());
        let mut progress = Vec::new();

        let solution = OrderExplorer::new(&board, SolverConfig::default())
            .unwrap()
            .solve_with_progress(|percent| progress.push(percent))
            .unwrap();
        assert!(solution.is_empty());
        assert_eq!(progress, vec![100]);
    }

    #[test]
    fn parallel_orders() {
        let board = three_pairs();
        let config = SolverConfig::default().with_parallel(ParallelConfig::new(2).with_batch_size(2));
        let explorer = OrderExplorer::new(&board, config).unwrap();

        let solution = explorer.solve().unwrap();
        assert_eq!(solution.verify(explorer.pairs()), Ok(()));

        let infeasible = SolverConfig::default().with_parallel(ParallelConfig::new(2));
        assert_eq!(
            OrderExplorer::new(&contested_center(), infeasible).unwrap().solve(),
            Err(SolveError::NoFeasibleOrder { tried: 2 })
        );
    }

    #[test]
    fn both_passes() {
        let board = three_pairs();
        let pairs = board.pairs().unwrap();
        let passes = solve_both(&board, &SolverConfig::default());

        let plain = passes.plain.unwrap();
        let turning = passes.turning.unwrap();
        assert_eq!(plain.verify(&pairs), Ok(()));
        assert_eq!(turning.verify(&pairs), Ok(()));
        assert_eq!(plain.total_cost(false), plain.iter().map(|(_, path)| path.length()).sum::<usize>());
    }

    #[test]
    fn cancelled_before_start() {
        let board = three_pairs();
        let explorer = OrderExplorer::new(&board, SolverConfig::default()).unwrap();

        explorer.cancel();
        assert_eq!(explorer.solve(), Err(SolveError::Cancelled));
    }

    #[test]
    fn background_solve_reports_progress() {
        let handle = SolveHandle::spawn(three_pairs(), SolverConfig::default());

        let mut progress = Vec::new();
        let mut outcome = None;
        for event in handle.events().iter() {
            match event {
                SolveEvent::Progress(percent) => progress.push(percent),
                SolveEvent::Finished(result) => {
                    outcome = Some(result);
                    break;
                }
            }
        }

        let solution = outcome.unwrap().unwrap();
        assert_eq!(solution.len(), 3);
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(progress.last(), Some(&100));
    }

    #[test]
    fn background_solve_cancel() {
        let handle = SolveHandle::spawn(three_pairs(), SolverConfig::default());
        handle.cancel();

        match handle.wait() {
            Ok(solution) => assert_eq!(solution.len(), 3),
            Err(err) => assert_eq!(err, SolveError::Cancelled),
        }
    }
}
