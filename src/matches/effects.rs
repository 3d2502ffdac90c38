//! Timed and positional state left behind by skills.

use crate::games::gomoku::{BOARD_SIZE, Coord, Player};
use crate::skills::SkillId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stone whose color is hidden from the opponent for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparentStone {
    /// Where the stone sits.
    pub at: Coord,
    /// Who placed it (the only seat that sees it while hidden).
    pub owner: Player,
    /// Value of the match turn counter at which the stone becomes visible.
    pub reveal_at_turn: u32,
}

/// Inclusive row/column bounds of a 3x3 area clamped to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaBounds {
    /// First row.
    pub min_row: usize,
    /// Last row.
    pub max_row: usize,
    /// First column.
    pub min_col: usize,
    /// Last column.
    pub max_col: usize,
}

impl AreaBounds {
    /// The 3x3 area around `center`, clamped to the board.
    pub fn around(center: Coord) -> Self {
        Self {
            min_row: center.row.saturating_sub(1),
            max_row: (center.row + 1).min(BOARD_SIZE - 1),
            min_col: center.col.saturating_sub(1),
            max_col: (center.col + 1).min(BOARD_SIZE - 1),
        }
    }

    /// Whether `at` lies inside the area.
    pub fn contains(&self, at: Coord) -> bool {
        (self.min_row..=self.max_row).contains(&at.row)
            && (self.min_col..=self.max_col).contains(&at.col)
    }
}

/// Restricts the target's next move to a 3x3 area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForcedArea {
    /// Center of the area.
    pub center: Coord,
    /// The player who must comply.
    pub target: Player,
    /// After this instant the restriction no longer applies.
    pub expires_at: DateTime<Utc>,
}

impl ForcedArea {
    /// Clamped bounds of the area.
    pub fn bounds(&self) -> AreaBounds {
        AreaBounds::around(self.center)
    }

    /// Whether the restriction still binds `player` at `now`.
    pub fn binds(&self, player: Player, now: DateTime<Utc>) -> bool {
        self.target == player && now < self.expires_at
    }
}

/// A timed effect (shield or blind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    /// Which skill produced it.
    pub skill: SkillId,
    /// Who cast it.
    pub owner: Player,
    /// Who it applies to.
    pub target: Player,
    /// When it stops applying.
    pub expires_at: DateTime<Utc>,
}

impl ActiveEffect {
    /// Whether the effect is unexpired at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
