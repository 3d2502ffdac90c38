//! Archived results of finished matches.

use crate::matches::{FinishReason, Identity, Match, MatchId, MatchMode, MatchType, MoveRecord, Winner};
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// How a finished match was decided.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchResult {
    /// Won on the board.
    Win,
    /// Nobody won.
    Draw,
    /// One side conceded.
    Surrender,
}

impl From<FinishReason> for MatchResult {
    fn from(reason: FinishReason) -> Self {
        match reason {
            FinishReason::FiveInARow => MatchResult::Win,
            FinishReason::Draw | FinishReason::NoLegalMoves => MatchResult::Draw,
            FinishReason::Surrender => MatchResult::Surrender,
        }
    }
}

/// One finished match, as archived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    match_id: MatchId,
    mode: MatchMode,
    match_type: MatchType,
    player1: Identity,
    player2: Identity,
    winner: Winner,
    result: MatchResult,
    total_moves: usize,
    duration_secs: i64,
    move_log: Vec<MoveRecord>,
    finished_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Builds the record of a finished match.
    ///
    /// # Errors
    ///
    /// [`StoreError`] if the match has not finished.
    #[track_caller]
    pub fn from_finished(game: &Match) -> Result<Self, StoreError> {
        let (Some(winner), Some(reason), Some(finished_at)) =
            (game.winner, game.finish_reason, game.finished_at)
        else {
            return Err(StoreError::new(format!("Match {} is not finished", game.id)));
        };

        Ok(Self {
            match_id: game.id.clone(),
            mode: game.mode,
            match_type: game.match_type,
            player1: game.player1.identity.clone(),
            player2: game
                .player2
                .as_ref()
                .map(|p| p.identity.clone())
                .unwrap_or_default(),
            winner,
            result: reason.into(),
            total_moves: game.move_log.len(),
            duration_secs: game.duration_secs.unwrap_or_default(),
            move_log: game.move_log.clone(),
            finished_at,
        })
    }

    /// Reassembles a record from stored columns.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        match_id: MatchId,
        mode: MatchMode,
        match_type: MatchType,
        player1: Identity,
        player2: Identity,
        winner: Winner,
        result: MatchResult,
        duration_secs: i64,
        move_log: Vec<MoveRecord>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            match_id,
            mode,
            match_type,
            player1,
            player2,
            winner,
            result,
            total_moves: move_log.len(),
            duration_secs,
            move_log,
            finished_at,
        }
    }

    /// Whether `user` sat at either seat.
    pub fn involves(&self, user: &str) -> bool {
        self.player1 == user || self.player2 == user
    }
}
