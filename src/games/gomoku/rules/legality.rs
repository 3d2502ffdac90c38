//! Move validation and placement.

use super::super::{Board, Cell, Coord, Player};
use crate::error::GameError;
use std::collections::BTreeSet;
use tracing::instrument;

/// Checks whether a stone may be placed at `(row, col)`.
///
/// Returns the validated coordinate. Never touches the board.
///
/// # Errors
///
/// - [`GameError::OutOfBounds`] if either index is outside `0..15`
/// - [`GameError::Occupied`] if the cell holds a stone
/// - [`GameError::Sealed`] if the cell is in `sealed`
#[instrument(skip(board, sealed))]
pub fn validate_move(
    board: &Board,
    row: i32,
    col: i32,
    sealed: &BTreeSet<Coord>,
) -> Result<Coord, GameError> {
    let at = Coord::from_signed(row, col).ok_or(GameError::OutOfBounds { row, col })?;

    if !board.is_empty(at) {
        return Err(GameError::Occupied { at });
    }

    if sealed.contains(&at) {
        return Err(GameError::Sealed { at });
    }

    Ok(at)
}

/// Returns a copy of `board` with one stone added.
///
/// The caller validates first; the input board is left as it was so callers
/// can discard the result to roll back.
pub fn apply_move(board: &Board, at: Coord, player: Player) -> Board {
    let mut next = board.clone();
    next.set(at, Cell::Stone(player));
    next
}
