//! What one participant is allowed to see of a match.

use super::effects::ForcedArea;
use super::model::{Match, MatchId, MatchMode, MatchStatus, MatchType, PlayerSlot, Winner};
use crate::games::gomoku::{Board, Coord, Player};
use crate::skills::SkillId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Snapshot of a match rendered for one viewer.
///
/// Transparent stones are shown as empty to everyone but their owner, the
/// opponent's loadout is withheld, and `blind` is set while the viewer is
/// under an unexpired blind effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    /// Match id.
    pub match_id: MatchId,
    /// Rule set.
    pub mode: MatchMode,
    /// Seat arrangement.
    pub match_type: MatchType,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Board as this viewer may see it.
    pub board: Board,
    /// Player to move.
    pub current_player: Player,
    /// Result once finished.
    pub winner: Option<Winner>,
    /// Seat 1.
    pub player1: PlayerSlot,
    /// Seat 2.
    pub player2: Option<PlayerSlot>,
    /// Sealed cells.
    pub sealed_cells: BTreeSet<Coord>,
    /// Active forced area, if any.
    pub forced_area: Option<ForcedArea>,
    /// The viewer's seat, if seated.
    pub you: Option<Player>,
    /// Render every stone in one color.
    pub blind: bool,
    /// Length of the move log.
    pub move_count: usize,
}

impl MatchView {
    /// Renders `game` for the participant `identity`.
    ///
    /// In a local match one client drives both seats, so it sees the board
    /// as the player to move.
    pub fn for_identity(game: &Match, identity: &str, now: DateTime<Utc>) -> Self {
        let viewer = match game.match_type {
            MatchType::LocalPvP if game.seat_of(identity).is_some() => Some(game.current_player),
            _ => game.seat_of(identity),
        };
        Self::for_viewer(game, viewer, now)
    }

    /// Renders `game` for `viewer` (`None` for an unseated observer).
    pub fn for_viewer(game: &Match, viewer: Option<Player>, now: DateTime<Utc>) -> Self {
        let hidden = game
            .transparent_cells
            .iter()
            .filter(|t| Some(t.owner) != viewer)
            .map(|t| t.at);

        let redact = |slot: &PlayerSlot| {
            let mut slot = slot.clone();
            if Some(slot.color) != viewer {
                slot.skills.clear();
            }
            slot
        };

        Self {
            match_id: game.id.clone(),
            mode: game.mode,
            match_type: game.match_type,
            status: game.status,
            board: game.board.masked(hidden),
            current_player: game.current_player,
            winner: game.winner,
            player1: redact(&game.player1),
            player2: game.player2.as_ref().map(redact),
            sealed_cells: game.sealed_cells.clone(),
            forced_area: game.forced_area.filter(|a| now < a.expires_at),
            you: viewer,
            blind: viewer.is_some_and(|v| game.has_effect(SkillId::Blind, v, now)),
            move_count: game.move_log.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::gomoku::Cell;
    use crate::matches::TransparentStone;
    use crate::skills::{BLIND_SECS, SkillAction, SkillSlot, use_skill};

    fn online() -> Match {
        Match::new(
            MatchId::new("v"),
            MatchMode::Skill,
            MatchType::OnlinePvP,
            PlayerSlot::new("alice", Player::Black, vec![SkillSlot::new(SkillId::Seal)]),
            Some(PlayerSlot::new("bob", Player::White, vec![SkillSlot::new(SkillId::Blind)])),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_opponent_loadout_withheld() {
        let game = online();
        let view = MatchView::for_identity(&game, "alice", Utc::now());
        assert_eq!(view.you, Some(Player::Black));
        assert_eq!(view.player1.skills.len(), 1);
        assert!(view.player2.unwrap().skills.is_empty());

        let observer = MatchView::for_viewer(&game, None, Utc::now());
        assert!(observer.player1.skills.is_empty());
        assert_eq!(observer.you, None);
    }

    #[test]
    fn test_transparent_stone_only_visible_to_owner() {
        let mut game = online();
        let at = Coord::new(3, 3);
        game.board.set(at, Cell::Stone(Player::Black));
        game.transparent_cells.push(TransparentStone {
            at,
            owner: Player::Black,
            reveal_at_turn: 2,
        });

        let now = Utc::now();
        assert_eq!(
            MatchView::for_identity(&game, "alice", now).board.get(at),
            Cell::Stone(Player::Black)
        );
        assert_eq!(
            MatchView::for_identity(&game, "bob", now).board.get(at),
            Cell::Empty
        );
        assert_eq!(MatchView::for_viewer(&game, None, now).board.get(at), Cell::Empty);
    }

    #[test]
    fn test_blind_flags_only_the_target_until_expiry() {
        let mut game = online();
        let now = Utc::now();
        use_skill(&mut game, Player::White, &SkillAction::Blind, now).unwrap();

        assert!(MatchView::for_identity(&game, "alice", now).blind);
        assert!(!MatchView::for_identity(&game, "bob", now).blind);
        assert!(!MatchView::for_viewer(&game, None, now).blind);

        let later = now + chrono::Duration::seconds(BLIND_SECS + 1);
        assert!(!MatchView::for_identity(&game, "alice", later).blind);
    }

    #[test]
    fn test_local_match_viewed_as_player_to_move() {
        let mut game = Match::new(
            MatchId::new("l"),
            MatchMode::Regular,
            MatchType::LocalPvP,
            PlayerSlot::new("alice", Player::Black, vec![]),
            Some(PlayerSlot::new("alice", Player::White, vec![])),
            None,
            Utc::now(),
        );
        let now = Utc::now();
        assert_eq!(MatchView::for_identity(&game, "alice", now).you, Some(Player::Black));
        game.submit_move(Player::Black, 7, 7, now).unwrap();
        assert_eq!(MatchView::for_identity(&game, "alice", now).you, Some(Player::White));
        assert_eq!(MatchView::for_identity(&game, "mallory", now).you, None);
    }
}
