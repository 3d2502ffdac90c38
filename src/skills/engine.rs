//! Shared skill preconditions and bookkeeping.

use super::action::{SkillAction, SkillOutcome};
use crate::error::GameError;
use crate::games::gomoku::Player;
use crate::matches::Match;
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

/// Lifetime of a forced area, in seconds.
pub const FORCE_MOVE_SECS: i64 = 60;
/// Lifetime of a shield, in seconds.
pub const SHIELD_SECS: i64 = 300;
/// Lifetime of a blind effect, in seconds.
pub const BLIND_SECS: i64 = 60;

/// Uses a skill for `player`.
///
/// Checks, in order: the match is in progress, the player owns the skill,
/// the skill is unused, and no opponent shield blocks it. The action then
/// validates its own parameters. Only after every check passes is the match
/// mutated and the skill marked used.
///
/// # Errors
///
/// The first failing check; `game` is left unchanged.
#[instrument(skip(game, now), fields(match_id = %game.id, skill = %action.id()))]
pub fn use_skill(
    game: &mut Match,
    player: Player,
    action: &SkillAction,
    now: DateTime<Utc>,
) -> Result<SkillOutcome, GameError> {
    game.ensure_in_progress()?;

    let skill = action.id();
    let slot = game
        .slot(player)
        .and_then(|slot| slot.skill(skill))
        .ok_or(GameError::SkillNotOwned { player, skill })?;
    if slot.used {
        return Err(GameError::SkillAlreadyUsed { skill });
    }
    if skill.is_shieldable() && game.has_effect(super::SkillId::Shield, player.opponent(), now) {
        return Err(GameError::SkillBlocked { skill });
    }

    let outcome = action.apply(game, player, now)?;

    if let Some(slot) = game
        .slot_mut(player)
        .and_then(|slot| slot.skills.iter_mut().find(|s| s.skill == skill))
    {
        slot.used = true;
    }
    game.active_effects.retain(|e| e.is_active(now));

    info!(%player, effect = ?outcome.effect, "Skill used");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::gomoku::{Cell, Coord};
    use crate::matches::{MatchId, MatchMode, MatchStatus, MatchType, PlayerSlot, TurnResult};
    use crate::skills::{SkillEffect, SkillId, SkillParams, SkillSlot};
    use strum::IntoEnumIterator;

    fn skill_match(black: &[SkillId], white: &[SkillId]) -> Match {
        let slots = |ids: &[SkillId]| ids.iter().copied().map(SkillSlot::new).collect();
        Match::new(
            MatchId::new("s"),
            MatchMode::Skill,
            MatchType::LocalPvP,
            PlayerSlot::new("alice", Player::Black, slots(black)),
            Some(PlayerSlot::new("alice", Player::White, slots(white))),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_seal_then_move_inside_is_rejected() {
        let mut m = skill_match(&[SkillId::Seal], &[]);
        let now = Utc::now();
        let outcome = use_skill(
            &mut m,
            Player::Black,
            &SkillAction::Seal { center: (5, 5) },
            now,
        )
        .unwrap();

        let SkillEffect::Seal { sealed } = outcome.effect else {
            panic!("expected seal effect");
        };
        assert_eq!(sealed.len(), 9);
        assert_eq!(sealed.first(), Some(&Coord::new(4, 4)));
        assert_eq!(sealed.last(), Some(&Coord::new(6, 6)));
        assert_eq!(m.current_player, Player::Black);

        assert_eq!(
            m.submit_move(Player::Black, 5, 5, now),
            Err(GameError::Sealed {
                at: Coord::new(5, 5)
            })
        );
    }

    #[test]
    fn test_shield_blocks_remove() {
        let mut m = skill_match(&[SkillId::Remove], &[SkillId::Shield]);
        let now = Utc::now();
        m.submit_move(Player::Black, 7, 7, now).unwrap();
        m.submit_move(Player::White, 8, 8, now).unwrap();

        use_skill(&mut m, Player::White, &SkillAction::Shield, now).unwrap();
        let before = m.clone();

        assert_eq!(
            use_skill(&mut m, Player::Black, &SkillAction::Remove { at: (8, 8) }, now),
            Err(GameError::SkillBlocked {
                skill: SkillId::Remove
            })
        );
        assert_eq!(m, before);
        assert_eq!(m.board.get(Coord::new(8, 8)), Cell::Stone(Player::White));
    }

    #[test]
    fn test_shield_blocks_only_disruptive_skills() {
        let cases = [
            (SkillAction::ChainMove { first: (0, 0), second: (0, 2) }, false),
            (SkillAction::XRay { at: (0, 0) }, false),
            (SkillAction::ForceMove { center: (3, 3) }, true),
            (SkillAction::Swap, false),
            (SkillAction::Seal { center: (3, 3) }, true),
            (SkillAction::Remove { at: (8, 8) }, true),
            (SkillAction::Shield, false),
            (SkillAction::Prophecy, false),
            (SkillAction::Clear, false),
            (SkillAction::Blind, false),
        ];
        assert_eq!(cases.len(), SkillId::iter().count());

        for (action, blocked) in cases {
            let skill = action.id();
            let mut m = skill_match(&[skill], &[SkillId::Shield]);
            let now = Utc::now();
            m.submit_move(Player::Black, 7, 7, now).unwrap();
            m.submit_move(Player::White, 8, 8, now).unwrap();
            use_skill(&mut m, Player::White, &SkillAction::Shield, now).unwrap();
            let before = m.clone();

            let result = use_skill(&mut m, Player::Black, &action, now);
            if blocked {
                assert_eq!(result, Err(GameError::SkillBlocked { skill }), "{skill}");
                assert_eq!(m, before, "{skill}");
            } else {
                assert!(result.is_ok(), "{skill}: {result:?}");
                assert!(m.player1.skills[0].used, "{skill}");
            }
        }
    }

    #[test]
    fn test_clear_wipes_board_but_keeps_turn() {
        let mut m = skill_match(&[SkillId::Seal, SkillId::XRay], &[SkillId::Clear]);
        let now = Utc::now();
        m.submit_move(Player::Black, 7, 7, now).unwrap();
        m.submit_move(Player::White, 8, 8, now).unwrap();
        use_skill(&mut m, Player::Black, &SkillAction::Seal { center: (3, 3) }, now).unwrap();
        use_skill(&mut m, Player::Black, &SkillAction::XRay { at: (0, 0) }, now).unwrap();
        assert_eq!(m.current_player, Player::White);
        assert!(!m.sealed_cells.is_empty());
        assert_eq!(m.transparent_cells.len(), 1);

        let outcome = use_skill(&mut m, Player::White, &SkillAction::Clear, now).unwrap();
        assert_eq!(outcome.effect, SkillEffect::Clear);
        assert_eq!(outcome.turn, None);
        assert_eq!(m.board.stone_count(), 0);
        assert!(m.move_log.is_empty());
        assert!(m.transparent_cells.is_empty());
        assert!(m.sealed_cells.is_empty());
        assert_eq!(m.current_player, Player::White);
        assert_eq!(m.status, MatchStatus::InProgress);
        m.submit_move(Player::White, 3, 3, now).unwrap();
    }

    #[test]
    fn test_shield_expires() {
        let mut m = skill_match(&[SkillId::Remove], &[SkillId::Shield]);
        let now = Utc::now();
        m.submit_move(Player::Black, 7, 7, now).unwrap();
        m.submit_move(Player::White, 8, 8, now).unwrap();
        use_skill(&mut m, Player::White, &SkillAction::Shield, now).unwrap();

        let later = now + chrono::Duration::seconds(SHIELD_SECS + 1);
        let outcome = use_skill(&mut m, Player::Black, &SkillAction::Remove { at: (8, 8) }, later)
            .unwrap();
        assert_eq!(
            outcome.effect,
            SkillEffect::Remove {
                removed: Coord::new(8, 8)
            }
        );
        assert!(m.board.is_empty(Coord::new(8, 8)));
        assert_eq!(m.move_log.len(), 1);
    }

    #[test]
    fn test_skill_used_once() {
        let mut m = skill_match(&[SkillId::Prophecy], &[SkillId::Blind, SkillId::Clear]);
        let now = Utc::now();
        let outcome = use_skill(&mut m, Player::Black, &SkillAction::Prophecy, now).unwrap();
        let SkillEffect::Prophecy { opponent_skills } = outcome.effect else {
            panic!("expected prophecy effect");
        };
        assert_eq!(opponent_skills.len(), 2);

        assert_eq!(
            use_skill(&mut m, Player::Black, &SkillAction::Prophecy, now),
            Err(GameError::SkillAlreadyUsed {
                skill: SkillId::Prophecy
            })
        );
    }

    #[test]
    fn test_unowned_skill() {
        let mut m = skill_match(&[SkillId::Swap], &[]);
        assert_eq!(
            use_skill(&mut m, Player::Black, &SkillAction::Clear, Utc::now()),
            Err(GameError::SkillNotOwned {
                player: Player::Black,
                skill: SkillId::Clear
            })
        );
    }

    #[test]
    fn test_chain_move_rejects_adjacent_targets() {
        let mut m = skill_match(&[SkillId::ChainMove], &[]);
        let action = SkillAction::ChainMove {
            first: (7, 7),
            second: (8, 8),
        };
        assert_eq!(
            use_skill(&mut m, Player::Black, &action, Utc::now()),
            Err(GameError::ChainTooClose {
                first: Coord::new(7, 7),
                second: Coord::new(8, 8)
            })
        );
        assert!(m.move_log.is_empty());
    }

    #[test]
    fn test_chain_move_places_two_and_passes_turn() {
        let mut m = skill_match(&[SkillId::ChainMove], &[]);
        let action = SkillAction::ChainMove {
            first: (7, 7),
            second: (7, 9),
        };
        let outcome = use_skill(&mut m, Player::Black, &action, Utc::now()).unwrap();
        assert_eq!(outcome.turn, Some(TurnResult::Continue));
        assert_eq!(m.move_log.len(), 2);
        assert_eq!(m.current_player, Player::White);
        assert!(m.player1.skills[0].used);
    }

    #[test]
    fn test_chain_move_can_win() {
        let mut m = skill_match(&[SkillId::ChainMove], &[]);
        let now = Utc::now();
        for col in [0, 1, 3] {
            m.submit_move(Player::Black, 0, col, now).unwrap();
            m.submit_move(Player::White, 9, col, now).unwrap();
        }
        let action = SkillAction::ChainMove {
            first: (0, 2),
            second: (0, 4),
        };
        let outcome = use_skill(&mut m, Player::Black, &action, now).unwrap();
        assert!(matches!(
            outcome.turn,
            Some(TurnResult::Won {
                winner: Player::Black,
                ..
            })
        ));
        assert_eq!(m.status, MatchStatus::Finished);
    }

    #[test]
    fn test_x_ray_stone_revealed_after_opponent_moves() {
        let mut m = skill_match(&[SkillId::XRay], &[]);
        let now = Utc::now();
        use_skill(&mut m, Player::Black, &SkillAction::XRay { at: (7, 7) }, now).unwrap();
        assert_eq!(m.transparent_cells.len(), 1);

        m.submit_move(Player::White, 0, 0, now).unwrap();
        assert!(m.transparent_cells.is_empty());
    }

    #[test]
    fn test_force_move_confines_opponent() {
        let mut m = skill_match(&[SkillId::ForceMove], &[]);
        let now = Utc::now();
        use_skill(
            &mut m,
            Player::Black,
            &SkillAction::ForceMove { center: (7, 7) },
            now,
        )
        .unwrap();
        m.submit_move(Player::Black, 0, 0, now).unwrap();

        assert_eq!(
            m.submit_move(Player::White, 0, 1, now),
            Err(GameError::OutsideForcedArea {
                at: Coord::new(0, 1),
                center: Coord::new(7, 7)
            })
        );
        m.submit_move(Player::White, 6, 6, now).unwrap();
        assert!(m.forced_area.is_none());
    }

    #[test]
    fn test_swap_flips_colors_and_turn() {
        let mut m = skill_match(&[], &[SkillId::Swap]);
        let now = Utc::now();
        m.submit_move(Player::Black, 7, 7, now).unwrap();
        use_skill(&mut m, Player::White, &SkillAction::Swap, now).unwrap();
        assert_eq!(m.board.get(Coord::new(7, 7)), Cell::Stone(Player::White));
        assert_eq!(m.current_player, Player::Black);
    }

    #[test]
    fn test_remove_requires_opponent_stone() {
        let mut m = skill_match(&[SkillId::Remove], &[]);
        let now = Utc::now();
        m.submit_move(Player::Black, 7, 7, now).unwrap();
        assert_eq!(
            use_skill(&mut m, Player::Black, &SkillAction::Remove { at: (7, 7) }, now),
            Err(GameError::NotOpponentStone {
                at: Coord::new(7, 7)
            })
        );
    }

    #[test]
    fn test_parse_rejects_missing_params() {
        assert_eq!(
            SkillAction::parse("seal", &SkillParams::default()),
            Err(GameError::InvalidSkillParams {
                skill: SkillId::Seal,
                expected: "centerRow and centerCol"
            })
        );
        assert_eq!(
            SkillAction::parse("teleport", &SkillParams::default()),
            Err(GameError::UnknownSkill {
                name: "teleport".to_string()
            })
        );
        assert_eq!(
            SkillAction::parse("blind", &SkillParams::default()),
            Ok(SkillAction::Blind)
        );
    }

    #[test]
    fn test_skills_rejected_before_start() {
        let mut m = Match::new(
            MatchId::new("w"),
            MatchMode::Skill,
            MatchType::OnlinePvP,
            PlayerSlot::new("alice", Player::Black, vec![SkillSlot::new(SkillId::Shield)]),
            None,
            None,
            Utc::now(),
        );
        assert_eq!(
            use_skill(&mut m, Player::Black, &SkillAction::Shield, Utc::now()),
            Err(GameError::MatchNotStarted)
        );
    }
}
