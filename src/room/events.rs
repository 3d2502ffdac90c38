//! Messages exchanged with connected sessions.

use crate::error::GameError;
use crate::games::gomoku::{Board, Coord, Player};
use crate::matches::{FinishReason, Identity, MatchId, MatchView, Winner};
use crate::skills::{SkillId, SkillParams};
use serde::{Deserialize, Serialize};

/// An event sent by a session. Encoded as JSON with a `type` tag, e.g.
/// `{"type":"make-move","matchId":"m-1","row":7,"col":7,"player":1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Attach to a room, claiming the free seat of a waiting match.
    JoinGame {
        /// Target match.
        match_id: MatchId,
    },
    /// Place a stone.
    MakeMove {
        /// Target match.
        match_id: MatchId,
        /// Row.
        row: i32,
        /// Column.
        col: i32,
        /// Acting player.
        player: Player,
    },
    /// Use a skill from the loadout.
    UseSkill {
        /// Target match.
        match_id: MatchId,
        /// Skill name, e.g. `"seal"`.
        skill_id: String,
        /// Acting player.
        player: Player,
        /// Skill parameters.
        #[serde(default)]
        params: SkillParams,
    },
    /// Concede.
    Surrender {
        /// Target match.
        match_id: MatchId,
        /// Conceding player.
        player: Player,
    },
    /// Detach from a room.
    LeaveGame {
        /// Target match.
        match_id: MatchId,
    },
}

impl ClientEvent {
    /// The match the event addresses.
    pub fn match_id(&self) -> &MatchId {
        match self {
            ClientEvent::JoinGame { match_id }
            | ClientEvent::MakeMove { match_id, .. }
            | ClientEvent::UseSkill { match_id, .. }
            | ClientEvent::Surrender { match_id, .. }
            | ClientEvent::LeaveGame { match_id } => match_id,
        }
    }
}

/// An event pushed to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Full snapshot, rendered for the recipient.
    GameState(MatchView),
    /// Someone attached to the room.
    PlayerJoined {
        /// Match.
        match_id: MatchId,
        /// Who joined.
        identity: Identity,
        /// Their seat, if any.
        seat: Option<Player>,
    },
    /// Someone detached from the room.
    PlayerLeft {
        /// Match.
        match_id: MatchId,
        /// Who left.
        identity: Identity,
    },
    /// A stone was placed by a regular move.
    MoveResult {
        /// Match.
        match_id: MatchId,
        /// Row.
        row: usize,
        /// Column.
        col: usize,
        /// Who moved.
        player: Player,
        /// Board as the recipient may see it.
        board: Board,
        /// Player to move next.
        current_player: Player,
    },
    /// The match ended.
    GameOver {
        /// Match.
        match_id: MatchId,
        /// Result.
        winner: Winner,
        /// Winning run, for five-in-a-row.
        win_line: Option<Vec<Coord>>,
        /// Why it ended.
        reason: FinishReason,
    },
    /// A skill took effect.
    SkillEffect {
        /// Match.
        match_id: MatchId,
        /// Which skill.
        skill_id: SkillId,
        /// Who used it.
        player: Player,
        /// What it did.
        effect: crate::skills::SkillEffect,
    },
    /// The recipient's last event was rejected.
    Error {
        /// Machine-readable code, e.g. `"SkillBlocked"`.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl From<&GameError> for ServerEvent {
    fn from(err: &GameError) -> Self {
        ServerEvent::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
