//! AI strength settings.

use serde::{Deserialize, Serialize};

/// How strong the AI plays.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    /// Mostly random.
    Easy,
    /// Random about a third of the time.
    #[default]
    Medium,
    /// Rarely random.
    Hard,
}

impl Difficulty {
    /// Probability of playing a uniformly random legal cell once no
    /// immediate win or loss is on the board.
    pub fn random_chance(self) -> f64 {
        match self {
            Difficulty::Easy => 0.7,
            Difficulty::Medium => 0.3,
            Difficulty::Hard => 0.1,
        }
    }

    /// Search depth. Above one, candidates that hand the opponent an
    /// immediate win are penalised.
    pub fn depth(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_and_default() {
        assert_eq!(Difficulty::from_str("hard"), Ok(Difficulty::Hard));
        assert_eq!(Difficulty::default(), Difficulty::Medium);
        assert_eq!(
            serde_json::from_str::<Difficulty>("\"easy\"").unwrap(),
            Difficulty::Easy
        );
    }
}
