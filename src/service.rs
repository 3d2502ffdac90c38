//! Match creation and read access for the CRUD layer.

use crate::ai::Difficulty;
use crate::error::GameError;
use crate::games::gomoku::Player;
use crate::matches::{AI_IDENTITY, Identity, Match, MatchId, MatchMode, MatchType, PlayerSlot};
use crate::room::RoomRegistry;
use crate::skills::{SkillSlot, draw_loadout};
use crate::store::MatchRecord;
use chrono::Utc;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Parameters of a new match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatch {
    /// Rule set.
    pub mode: MatchMode,
    /// Seat arrangement.
    pub match_type: MatchType,
    /// Seat 1 (Black).
    pub player1: Identity,
    /// Seat 2 (White) for an online match, when already known.
    #[serde(default)]
    pub player2: Option<Identity>,
    /// AI strength for a match against the AI.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

/// Creates matches and serves read access to live and finished ones.
#[derive(Debug, Clone)]
pub struct MatchService {
    registry: RoomRegistry,
    default_difficulty: Difficulty,
}

impl MatchService {
    /// Creates a service over a room registry.
    pub fn new(registry: RoomRegistry, default_difficulty: Difficulty) -> Self {
        Self {
            registry,
            default_difficulty,
        }
    }

    /// The registry rooms live in.
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Creates a match and opens its room.
    ///
    /// Against the AI, seat 2 is the AI identity and gets no skills. A local
    /// match seats the same identity twice. An online match without a
    /// second player waits for one to join.
    #[instrument(skip(self), fields(player1 = %request.player1))]
    pub fn create_match(&self, request: CreateMatch) -> Match {
        let now = Utc::now();
        let mut rng = rand::thread_rng();
        let id = MatchId::generate(&mut rng);

        let mut loadout = |human: bool| -> Vec<SkillSlot> {
            if human && request.mode == MatchMode::Skill {
                draw_loadout(&mut rng)
            } else {
                Vec::new()
            }
        };

        let player1 = PlayerSlot::new(request.player1.clone(), Player::Black, loadout(true));
        let (player2, difficulty) = match request.match_type {
            MatchType::VsAI => (
                Some(PlayerSlot::new(AI_IDENTITY, Player::White, loadout(false))),
                Some(request.difficulty.unwrap_or(self.default_difficulty)),
            ),
            MatchType::LocalPvP => (
                Some(PlayerSlot::new(request.player1.clone(), Player::White, loadout(true))),
                None,
            ),
            MatchType::OnlinePvP => (
                request
                    .player2
                    .clone()
                    .map(|identity| PlayerSlot::new(identity, Player::White, loadout(true))),
                None,
            ),
        };

        let game = Match::new(
            id,
            request.mode,
            request.match_type,
            player1,
            player2,
            difficulty,
            now,
        );
        self.registry.open(game.clone());
        info!(match_id = %game.id, status = %game.status, "Match created");
        game
    }

    /// The current state of a match, live or stored.
    ///
    /// # Errors
    ///
    /// [`GameError::GameNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn get_match(&self, id: &MatchId) -> Result<Match, GameError> {
        if let Some(handle) = self.registry.live(id)
            && let Ok(game) = handle.snapshot().await
        {
            return Ok(game);
        }
        self.registry
            .store()
            .load(id)
            .await?
            .ok_or_else(|| GameError::GameNotFound {
                match_id: id.to_string(),
            })
    }

    /// The archived record of a finished match.
    #[instrument(skip(self))]
    pub async fn record(&self, id: &MatchId) -> Result<Option<MatchRecord>, GameError> {
        Ok(self.registry.store().record(id).await?)
    }

    /// Recent finished matches of `user`, newest first.
    #[instrument(skip(self))]
    pub async fn history(&self, user: &str, limit: usize) -> Result<Vec<MatchRecord>, GameError> {
        Ok(self.registry.store().records_for_user(user, limit).await?)
    }
}
