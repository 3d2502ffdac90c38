//! Positional scoring used by the AI opponent. Never affects legality.

use super::super::{Board, Cell, Coord, Player};
use super::AXES;

/// Score of a run of five or more.
pub const SCORE_FIVE: i64 = 100_000;
/// Score of four with both ends open.
pub const SCORE_OPEN_FOUR: i64 = 10_000;
/// Score of four with an end blocked.
pub const SCORE_BLOCKED_FOUR: i64 = 1_000;
/// Score of three with both ends open.
pub const SCORE_OPEN_THREE: i64 = 100;
/// Score of three with an end blocked.
pub const SCORE_BLOCKED_THREE: i64 = 10;
/// Score of two with both ends open.
pub const SCORE_OPEN_TWO: i64 = 5;

/// How a scan along one direction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunEnd {
    /// Stopped at an empty cell.
    Open,
    /// Stopped at the board edge or an opponent stone.
    Blocked,
}

/// Counts `player`'s stones walking away from `at` until an empty cell,
/// an opponent stone, or the edge.
fn scan(board: &Board, at: Coord, (dr, dc): (isize, isize), player: Player) -> (usize, RunEnd) {
    let mut count = 0;
    let mut step = 1;
    loop {
        match at.offset(dr, dc, step).map(|c| board.get(c)) {
            Some(Cell::Stone(p)) if p == player => count += 1,
            Some(Cell::Empty) => return (count, RunEnd::Open),
            Some(Cell::Stone(_)) | None => return (count, RunEnd::Blocked),
        }
        step += 1;
    }
}

/// Scores placing a `player` stone at `at`.
///
/// For each axis the run through `at` is measured (the cell itself counts as
/// one stone). If either end of the run is blocked the run counts as blocked.
/// Per-axis scores are summed.
pub fn evaluate_position(board: &Board, at: Coord, player: Player) -> i64 {
    AXES.iter()
        .map(|&(dr, dc)| {
            let (ahead, ahead_end) = scan(board, at, (dr, dc), player);
            let (behind, behind_end) = scan(board, at, (-dr, -dc), player);
            let total = ahead + behind + 1;
            let open = ahead_end == RunEnd::Open && behind_end == RunEnd::Open;

            match (total, open) {
                (t, _) if t >= 5 => SCORE_FIVE,
                (4, true) => SCORE_OPEN_FOUR,
                (4, false) => SCORE_BLOCKED_FOUR,
                (3, true) => SCORE_OPEN_THREE,
                (3, false) => SCORE_BLOCKED_THREE,
                (2, true) => SCORE_OPEN_TWO,
                _ => 0,
            }
        })
        .sum()
}

/// Checks whether placing a `player` stone at `at` makes exactly four in a
/// row with an empty cell at both ends, on any axis.
pub fn forms_open_four(board: &Board, at: Coord, player: Player) -> bool {
    AXES.iter().any(|&(dr, dc)| {
        let (ahead, ahead_end) = scan(board, at, (dr, dc), player);
        let (behind, behind_end) = scan(board, at, (-dr, -dc), player);
        ahead + behind + 1 == 4 && ahead_end == RunEnd::Open && behind_end == RunEnd::Open
    })
}
