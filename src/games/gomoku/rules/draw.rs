//! Draw detection for five-in-a-row.

use super::super::Board;
use tracing::instrument;

/// Checks if the board has no empty cell left.
///
/// Callers run [`check_win`](super::check_win) on the last stone first; a
/// full board is only a draw when that move did not win.
#[instrument(skip(board))]
pub fn check_draw(board: &Board) -> bool {
    board.is_full()
}

#[cfg(test)]
mod tests {
    use super::super::check_win;
    use super::*;
    use crate::games::gomoku::{Cell, Coord, Player};

    /// Pairs of stones alternating along rows, shifted by one every row.
    /// No axis ever holds five of one color.
    fn full_drawn_board() -> Board {
        let mut board = Board::new();
        for at in Coord::all() {
            let player = if (at.col / 2 + at.row) % 2 == 0 {
                Player::Black
            } else {
                Player::White
            };
            board.set(at, Cell::Stone(player));
        }
        board
    }

    #[test]
    fn test_empty_board_not_draw() {
        assert!(!check_draw(&Board::new()));
    }

    #[test]
    fn test_full_board_without_five_is_draw() {
        let board = full_drawn_board();
        assert!(Coord::all().all(|at| {
            let Cell::Stone(player) = board.get(at) else {
                return false;
            };
            check_win(&board, at, player).is_none()
        }));
        assert!(check_draw(&board));
    }

    #[test]
    fn test_one_gap_not_draw() {
        let mut board = full_drawn_board();
        board.set(Coord::new(14, 14), Cell::Empty);
        assert!(!check_draw(&board));
    }
}
