//! Errors reported to the session that submitted an event.

use crate::games::gomoku::{Coord, Player};
use crate::skills::SkillId;
use crate::store::StoreError;

/// Every way a match operation can be rejected.
///
/// All variants except [`GameError::Store`] are recoverable, session-local
/// failures: the match is left untouched and only the submitting session is
/// told. The variant name doubles as the machine-readable error code
/// (see [`GameError::code`]).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, strum::IntoStaticStr)]
pub enum GameError {
    // ── move legality ──────────────────────────────────────────
    /// The coordinate is outside the board.
    #[display("Position ({}, {}) is outside the board", row, col)]
    OutOfBounds {
        /// Requested row.
        row: i32,
        /// Requested column.
        col: i32,
    },

    /// The cell already holds a stone.
    #[display("Cell {} is already occupied", at)]
    Occupied {
        /// Target cell.
        at: Coord,
    },

    /// The cell is sealed.
    #[display("Cell {} is sealed", at)]
    Sealed {
        /// Target cell.
        at: Coord,
    },

    /// The mover is restricted to a forced area and the cell lies outside it.
    #[display("Cell {} is outside the forced area around {}", at, center)]
    OutsideForcedArea {
        /// Target cell.
        at: Coord,
        /// Center of the forced area.
        center: Coord,
    },

    // ── turn / state ───────────────────────────────────────────
    /// It's not this player's turn.
    #[display("It's not {}'s turn", player)]
    NotYourTurn {
        /// Player that tried to act.
        player: Player,
    },

    /// No match with that id exists.
    #[display("Match {} not found", match_id)]
    GameNotFound {
        /// Requested match id.
        match_id: String,
    },

    /// The match is already over.
    #[display("Match is already finished")]
    GameAlreadyFinished,

    /// The match is still waiting for its second player.
    #[display("Match has not started yet")]
    MatchNotStarted,

    /// Both seats are already taken by other identities.
    #[display("Match already has two players")]
    MatchFull,

    // ── skills ─────────────────────────────────────────────────
    /// The player's loadout does not contain the skill.
    #[display("{} does not own skill {}", player, skill)]
    SkillNotOwned {
        /// Acting player.
        player: Player,
        /// Requested skill.
        skill: SkillId,
    },

    /// The skill was already consumed this match.
    #[display("Skill {} was already used", skill)]
    SkillAlreadyUsed {
        /// Requested skill.
        skill: SkillId,
    },

    /// The opponent's shield blocks the skill.
    #[display("Skill {} is blocked by the opponent's shield", skill)]
    SkillBlocked {
        /// Requested skill.
        skill: SkillId,
    },

    /// The skill id is not one of the ten known skills.
    #[display("Unknown skill '{}'", name)]
    UnknownSkill {
        /// Name as submitted.
        name: String,
    },

    /// The parameters the skill needs were not supplied.
    #[display("Skill {} needs {}", skill, expected)]
    InvalidSkillParams {
        /// Requested skill.
        skill: SkillId,
        /// What was missing.
        expected: &'static str,
    },

    /// Chain-move targets touch each other.
    #[display("Chain-move targets {} and {} are adjacent", first, second)]
    ChainTooClose {
        /// First target.
        first: Coord,
        /// Second target.
        second: Coord,
    },

    /// Remove targeted something other than an opponent stone.
    #[display("Cell {} does not hold an opponent stone", at)]
    NotOpponentStone {
        /// Target cell.
        at: Coord,
    },

    // ── infrastructure ─────────────────────────────────────────
    /// The persistence collaborator failed; the event was not applied.
    #[display("{}", _0)]
    Store(#[error(source)] StoreError),
}

impl GameError {
    /// Stable machine-readable code (the variant name).
    pub fn code(&self) -> &'static str {
        self.into()
    }
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
