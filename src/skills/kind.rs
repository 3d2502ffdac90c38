//! The ten skill identifiers.

use serde::{Deserialize, Serialize};

/// Broad grouping of a skill, shown to players when choosing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SkillCategory {
    /// Pushes the caster's own position.
    Offensive,
    /// Disrupts the opponent.
    Defensive,
    /// Information and board-wide effects.
    Support,
}

/// Identifier of a skill. Wire names are kebab-case (`"chain-move"`, `"x-ray"`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SkillId {
    /// Place two non-adjacent stones this turn.
    ChainMove,
    /// Place a stone the opponent cannot see for a turn.
    XRay,
    /// Confine the opponent's next move to a 3x3 area.
    ForceMove,
    /// Swap the colors of all stones.
    Swap,
    /// Seal the empty cells of a 3x3 area.
    Seal,
    /// Remove one opponent stone.
    Remove,
    /// Block force-move, remove and seal for five minutes.
    Shield,
    /// Reveal the opponent's loadout.
    Prophecy,
    /// Clear the board.
    Clear,
    /// Make the opponent see every stone in one color.
    Blind,
}

impl SkillId {
    /// Grouping used by the skill panel.
    pub fn category(self) -> SkillCategory {
        match self {
            SkillId::ChainMove | SkillId::XRay | SkillId::ForceMove | SkillId::Swap => {
                SkillCategory::Offensive
            }
            SkillId::Seal | SkillId::Remove | SkillId::Shield => SkillCategory::Defensive,
            SkillId::Prophecy | SkillId::Clear | SkillId::Blind => SkillCategory::Support,
        }
    }

    /// One-line description.
    pub fn description(self) -> &'static str {
        match self {
            SkillId::ChainMove => "Place two stones this turn; they may not touch",
            SkillId::XRay => "Place a stone your opponent cannot see until their turn is over",
            SkillId::ForceMove => "Your opponent's next move must land in a 3x3 area",
            SkillId::Swap => "Every black stone turns white and every white stone black",
            SkillId::Seal => "Empty cells in a 3x3 area can no longer be played",
            SkillId::Remove => "Take one of your opponent's stones off the board",
            SkillId::Shield => "For five minutes, force-move, remove and seal cannot target you",
            SkillId::Prophecy => "See which skills your opponent holds and has used",
            SkillId::Clear => "Remove every stone and seal from the board",
            SkillId::Blind => "For one minute your opponent sees every stone in one color",
        }
    }

    /// Skills a shield protects against.
    pub fn is_shieldable(self) -> bool {
        matches!(self, SkillId::ForceMove | SkillId::Remove | SkillId::Seal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_wire_names() {
        assert_eq!(SkillId::XRay.to_string(), "x-ray");
        assert_eq!(SkillId::from_str("chain-move"), Ok(SkillId::ChainMove));
        assert_eq!(
            serde_json::to_string(&SkillId::ForceMove).unwrap(),
            "\"force-move\""
        );
        assert!(SkillId::from_str("teleport").is_err());
    }

    #[test]
    fn test_ten_skills_three_shieldable() {
        assert_eq!(SkillId::iter().count(), 10);
        assert_eq!(SkillId::iter().filter(|s| s.is_shieldable()).count(), 3);
    }
}
