use std::collections::BTreeMap;
use std::num::NonZero;

use crossline::board::print;
use crossline::{solve_both, Board, BoardBuilder, Location, Solution, SolveError, SolverConfig};

fn report(board: &Board, title: &str, turn_penalty: bool, outcome: &Result<Solution, SolveError>) {
    println!("{}", title);
    match outcome {
        Ok(solution) => {
            print!("{}", print(&board.render(Some(solution))));
            for (color, path) in solution.iter() {
                println!(
                    "  color {}: length {}, {} turns, cost {}",
                    color,
                    path.length(),
                    path.turns(),
                    path.cost(turn_penalty),
                );
            }
            println!(
                "  {} cells used, total cost {}",
                solution.cells_used(),
                solution.total_cost(turn_penalty),
            );
        }
        Err(err) => println!("  failed: {}", err),
    }
}

fn main() {
    let pairs = BTreeMap::from([
        (NonZero::new(1).unwrap(), (Location(0, 0), Location(3, 3))),
        (NonZero::new(2).unwrap(), (Location(1, 1), Location(2, 3))),
        (NonZero::new(3).unwrap(), (Location(2, 2), Location(3, 0))),
    ]);
    let board = BoardBuilder::from_pairs(NonZero::new(8).unwrap(), &pairs).unwrap();

    print!("{}", board);
    println!();

    let passes = solve_both(&board, &SolverConfig::default());
    report(&board, "shortest paths:", false, &passes.plain);
    println!();
    report(&board, "with turn penalty:", true, &passes.turning);
}
