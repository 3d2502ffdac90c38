//! Win detection for five-in-a-row.

use super::super::{Board, Coord, Player};
use super::AXES;
use tracing::instrument;

/// Number of contiguous stones needed to win.
pub const WIN_LENGTH: usize = 5;

/// Checks whether the stone just played at `at` completes five or more in a row.
///
/// The cell itself always counts as one of `player`'s stones. Each axis is
/// scanned outwards in both directions; any run of five or more wins.
/// Returns the first five coordinates of the winning run (starting from the
/// far end of the backward scan), or `None`.
#[instrument(level = "trace", skip(board))]
pub fn check_win(board: &Board, at: Coord, player: Player) -> Option<Vec<Coord>> {
    for (dr, dc) in AXES {
        let backward: Vec<Coord> = (1..)
            .map_while(|step| at.offset(-dr, -dc, step))
            .take_while(|c| board.is_stone(*c, player))
            .collect();
        let forward: Vec<Coord> = (1..)
            .map_while(|step| at.offset(dr, dc, step))
            .take_while(|c| board.is_stone(*c, player))
            .collect();

        if backward.len() + forward.len() + 1 >= WIN_LENGTH {
            let line: Vec<Coord> = backward
                .into_iter()
                .rev()
                .chain(std::iter::once(at))
                .chain(forward)
                .take(WIN_LENGTH)
                .collect();
            return Some(line);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::gomoku::Cell;

    fn board_with(stones: &[(usize, usize)], player: Player) -> Board {
        let mut board = Board::new();
        for &(row, col) in stones {
            board.set(Coord::new(row, col), Cell::Stone(player));
        }
        board
    }

    #[test]
    fn test_horizontal_five_reports_line() {
        let board = board_with(&[(7, 3), (7, 4), (7, 5), (7, 6), (7, 7)], Player::Black);
        let line = check_win(&board, Coord::new(7, 7), Player::Black).expect("five wins");
        let expected: Vec<_> = (3..=7).map(|c| Coord::new(7, c)).collect();
        assert_eq!(line, expected);
    }

    #[test]
    fn test_four_does_not_win() {
        let board = board_with(&[(7, 3), (7, 4), (7, 5), (7, 6)], Player::Black);
        assert_eq!(check_win(&board, Coord::new(7, 6), Player::Black), None);
    }

    #[test]
    fn test_vertical_win_from_middle() {
        let board = board_with(&[(2, 9), (3, 9), (4, 9), (5, 9), (6, 9)], Player::White);
        let line = check_win(&board, Coord::new(4, 9), Player::White).expect("five wins");
        assert_eq!(line.first(), Some(&Coord::new(2, 9)));
        assert_eq!(line.last(), Some(&Coord::new(6, 9)));
    }

    #[test]
    fn test_anti_diagonal_win() {
        let board = board_with(&[(0, 4), (1, 3), (2, 2), (3, 1), (4, 0)], Player::Black);
        assert!(check_win(&board, Coord::new(2, 2), Player::Black).is_some());
    }

    #[test]
    fn test_overline_counts_as_win() {
        let board = board_with(
            &[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4), (5, 5)],
            Player::Black,
        );
        let line = check_win(&board, Coord::new(5, 5), Player::Black).expect("six wins");
        assert_eq!(line.len(), WIN_LENGTH);
    }

    #[test]
    fn test_opponent_stone_breaks_run() {
        let mut board = board_with(&[(7, 3), (7, 4), (7, 6), (7, 7)], Player::Black);
        board.set(Coord::new(7, 5), Cell::Stone(Player::White));
        assert_eq!(check_win(&board, Coord::new(7, 7), Player::Black), None);
    }
}
