//! Invariants of the match aggregate.
//!
//! The room checks these after every accepted event. A violation is a
//! programming error, not a user error.

use super::model::{Match, MatchStatus};
use crate::games::gomoku::Cell;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Status agrees with the result fields and seats.
pub struct StatusConsistentInvariant;

impl Invariant<Match> for StatusConsistentInvariant {
    fn holds(m: &Match) -> bool {
        match m.status {
            MatchStatus::Waiting => m.player2.is_none() && m.winner.is_none(),
            MatchStatus::InProgress => m.player2.is_some() && m.winner.is_none(),
            MatchStatus::Finished => m.winner.is_some() && m.finished_at.is_some(),
        }
    }

    fn description() -> &'static str {
        "Status agrees with winner and seats"
    }
}

/// Every stone on the board has exactly one log entry and vice versa.
pub struct LogMatchesBoardInvariant;

impl Invariant<Match> for LogMatchesBoardInvariant {
    fn holds(m: &Match) -> bool {
        m.move_log.len() == m.board.stone_count()
            && m.move_log.iter().all(|r| m.board.get(r.at()) != Cell::Empty)
    }

    fn description() -> &'static str {
        "Move log and board stones correspond one to one"
    }
}

/// Sealed cells never hold stones.
pub struct SealedCellsEmptyInvariant;

impl Invariant<Match> for SealedCellsEmptyInvariant {
    fn holds(m: &Match) -> bool {
        m.sealed_cells.iter().all(|at| m.board.is_empty(*at))
    }

    fn description() -> &'static str {
        "Sealed cells are empty"
    }
}

/// All match invariants as a composable set.
pub type MatchInvariants = (
    StatusConsistentInvariant,
    LogMatchesBoardInvariant,
    SealedCellsEmptyInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::gomoku::{Coord, Player};
    use crate::matches::{MatchId, MatchMode, MatchType, PlayerSlot};
    use chrono::Utc;

    fn game() -> Match {
        Match::new(
            MatchId::new("inv"),
            MatchMode::Regular,
            MatchType::LocalPvP,
            PlayerSlot::new("a", Player::Black, vec![]),
            Some(PlayerSlot::new("a", Player::White, vec![])),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_invariants_hold_after_moves() {
        let mut m = game();
        m.submit_move(Player::Black, 7, 7, Utc::now()).unwrap();
        m.submit_move(Player::White, 7, 8, Utc::now()).unwrap();
        assert!(MatchInvariants::check_all(&m).is_ok());
    }

    #[test]
    fn test_detects_unlogged_stone() {
        let mut m = game();
        m.board.set(Coord::new(0, 0), Cell::Stone(Player::Black));
        let violations = MatchInvariants::check_all(&m).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].description, LogMatchesBoardInvariant::description());
    }
}
