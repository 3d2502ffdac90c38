//! Per-seat skill loadouts.

use super::kind::SkillId;
use rand::Rng;
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Number of skills each human seat draws.
pub const LOADOUT_SIZE: usize = 3;

/// One skill in a loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSlot {
    /// Which skill.
    #[serde(rename = "skillId")]
    pub skill: SkillId,
    /// Whether it has been consumed.
    pub used: bool,
}

impl SkillSlot {
    /// An unused slot.
    pub fn new(skill: SkillId) -> Self {
        Self { skill, used: false }
    }
}

/// Draws [`LOADOUT_SIZE`] distinct skills uniformly without replacement.
pub fn draw_loadout(rng: &mut impl Rng) -> Vec<SkillSlot> {
    SkillId::iter()
        .choose_multiple(rng, LOADOUT_SIZE)
        .into_iter()
        .map(SkillSlot::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_loadout_is_three_distinct_unused() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let loadout = draw_loadout(&mut rng);
            assert_eq!(loadout.len(), LOADOUT_SIZE);
            let ids: HashSet<_> = loadout.iter().map(|s| s.skill).collect();
            assert_eq!(ids.len(), LOADOUT_SIZE);
            assert!(loadout.iter().all(|s| !s.used));
        }
    }
}
