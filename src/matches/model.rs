//! Match aggregate root.

use super::effects::{ActiveEffect, ForcedArea, TransparentStone};
use crate::ai::Difficulty;
use crate::error::GameError;
use crate::games::gomoku::{Board, Cell, Coord, Player, check_draw, check_win, validate_move};
use crate::skills::{SkillId, SkillSlot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, instrument};

/// Stable identity of a participant (a user id, or [`AI_IDENTITY`]).
pub type Identity = String;

/// Identity occupying the AI seat.
pub const AI_IDENTITY: &str = "ai";

/// Unique identifier for a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Wraps an existing id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random id.
    pub fn generate(rng: &mut impl rand::Rng) -> Self {
        Self(format!("m-{:016x}", rng.gen_range(0..=u64::MAX)))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Rule set of a match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchMode {
    /// Plain five-in-a-row.
    #[serde(alias = "normal")]
    Regular,
    /// Each human seat draws three skills.
    Skill,
}

/// Who sits at the two seats.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum MatchType {
    /// Both seats driven from one client.
    #[serde(rename = "local")]
    #[strum(serialize = "local")]
    LocalPvP,
    /// Seat 2 is the AI opponent.
    #[serde(rename = "ai")]
    #[strum(serialize = "ai")]
    VsAI,
    /// Two remote participants.
    #[serde(rename = "online")]
    #[strum(serialize = "online")]
    OnlinePvP,
}

/// Lifecycle status. Only ever moves forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MatchStatus {
    /// Waiting for the second participant.
    Waiting,
    /// Being played.
    InProgress,
    /// Over; accepts no further moves or skills.
    Finished,
}

/// Final result. On the wire: `1`, `2`, or `0` for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Winner {
    /// A player won.
    Player(Player),
    /// Nobody won.
    Draw,
}

impl From<Winner> for u8 {
    fn from(winner: Winner) -> Self {
        match winner {
            Winner::Player(p) => p.number(),
            Winner::Draw => 0,
        }
    }
}

impl TryFrom<u8> for Winner {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(Winner::Draw),
            n => Player::try_from(n).map(Winner::Player),
        }
    }
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FinishReason {
    /// Five or more in a row.
    FiveInARow,
    /// Board filled up.
    Draw,
    /// A player conceded.
    Surrender,
    /// The AI had nowhere legal to play.
    NoLegalMoves,
}

/// One entry of the move log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    /// Who placed the stone.
    pub player: Player,
    /// Row of the stone.
    pub row: usize,
    /// Column of the stone.
    pub col: usize,
    /// When it was placed.
    pub timestamp: DateTime<Utc>,
    /// The skill that placed it, if any.
    pub skill_used: Option<SkillId>,
}

impl MoveRecord {
    /// Coordinate of the stone.
    pub fn at(&self) -> Coord {
        Coord::new(self.row, self.col)
    }
}

/// A seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSlot {
    /// Who sits here.
    pub identity: Identity,
    /// Stone color (Black is seat 1).
    pub color: Player,
    /// Skills drawn for a skill-mode match.
    pub skills: Vec<SkillSlot>,
}

impl PlayerSlot {
    /// Creates a seat.
    pub fn new(identity: impl Into<Identity>, color: Player, skills: Vec<SkillSlot>) -> Self {
        Self {
            identity: identity.into(),
            color,
            skills,
        }
    }

    /// Whether this is the AI seat.
    pub fn is_ai(&self) -> bool {
        self.identity == AI_IDENTITY
    }

    /// Looks up a skill in the loadout.
    pub fn skill(&self, skill: SkillId) -> Option<&SkillSlot> {
        self.skills.iter().find(|s| s.skill == skill)
    }

    /// Skill ids used so far.
    pub fn used_skills(&self) -> Vec<SkillId> {
        self.skills.iter().filter(|s| s.used).map(|s| s.skill).collect()
    }
}

/// Result of a placement: the match either continues or has just ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnResult {
    /// Play continues; the turn passed to the other player.
    Continue,
    /// The placing player made five in a row.
    Won {
        /// The winner.
        winner: Player,
        /// First five stones of the winning run.
        line: Vec<Coord>,
    },
    /// The board filled up without a winner.
    Draw,
}

impl TurnResult {
    /// Whether the match ended.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TurnResult::Continue)
    }
}

/// The match aggregate.
///
/// Mutated only through its methods and the skill engine, and only from
/// the room that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// Unique id.
    pub id: MatchId,
    /// Rule set.
    pub mode: MatchMode,
    /// Seat arrangement.
    pub match_type: MatchType,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Player to move.
    pub current_player: Player,
    /// Result once finished.
    pub winner: Option<Winner>,
    /// Why it finished.
    pub finish_reason: Option<FinishReason>,
    /// Winning run, when won on the board.
    pub win_line: Option<Vec<Coord>>,
    /// Stones on the board.
    pub board: Board,
    /// Append-only move log (only `remove` deletes entries).
    pub move_log: Vec<MoveRecord>,
    /// Seat 1 (Black).
    pub player1: PlayerSlot,
    /// Seat 2 (White); empty while an online match waits.
    pub player2: Option<PlayerSlot>,
    /// Cells no one may play on.
    pub sealed_cells: BTreeSet<Coord>,
    /// Stones hidden from the opponent.
    pub transparent_cells: Vec<TransparentStone>,
    /// Area restriction for one player's next move.
    pub forced_area: Option<ForcedArea>,
    /// Timed effects, oldest first.
    pub active_effects: Vec<ActiveEffect>,
    /// Strength of the AI seat, if any.
    pub ai_difficulty: Option<Difficulty>,
    /// Completed turns; drives transparent stone reveal.
    pub turns_played: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// When both seats were filled.
    pub started_at: Option<DateTime<Utc>>,
    /// When it ended.
    pub finished_at: Option<DateTime<Utc>>,
    /// Seconds between start and finish.
    pub duration_secs: Option<i64>,
}

impl Match {
    /// Creates a match. It starts in progress when both seats are known,
    /// otherwise it waits for a second participant.
    #[instrument(skip(player1, player2), fields(player1 = %player1.identity))]
    pub fn new(
        id: MatchId,
        mode: MatchMode,
        match_type: MatchType,
        player1: PlayerSlot,
        player2: Option<PlayerSlot>,
        ai_difficulty: Option<Difficulty>,
        now: DateTime<Utc>,
    ) -> Self {
        let status = if player2.is_some() {
            MatchStatus::InProgress
        } else {
            MatchStatus::Waiting
        };
        info!(match_id = %id, ?mode, ?match_type, %status, "Creating match");
        Self {
            id,
            mode,
            match_type,
            status,
            current_player: Player::Black,
            winner: None,
            finish_reason: None,
            win_line: None,
            board: Board::new(),
            move_log: Vec::new(),
            player1,
            player2,
            sealed_cells: BTreeSet::new(),
            transparent_cells: Vec::new(),
            forced_area: None,
            active_effects: Vec::new(),
            ai_difficulty,
            turns_played: 0,
            created_at: now,
            started_at: (status == MatchStatus::InProgress).then_some(now),
            finished_at: None,
            duration_secs: None,
        }
    }

    /// The seat playing `player`.
    pub fn slot(&self, player: Player) -> Option<&PlayerSlot> {
        match player {
            Player::Black => Some(&self.player1),
            Player::White => self.player2.as_ref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, player: Player) -> Option<&mut PlayerSlot> {
        match player {
            Player::Black => Some(&mut self.player1),
            Player::White => self.player2.as_mut(),
        }
    }

    /// The seat an identity occupies (seat 1 first).
    pub fn seat_of(&self, identity: &str) -> Option<Player> {
        if self.player1.identity == identity {
            Some(Player::Black)
        } else if self.player2.as_ref().is_some_and(|p| p.identity == identity) {
            Some(Player::White)
        } else {
            None
        }
    }

    /// Whether the AI is to move.
    pub fn is_ai_turn(&self) -> bool {
        self.status == MatchStatus::InProgress
            && self.slot(self.current_player).is_some_and(PlayerSlot::is_ai)
    }

    /// Seats `identity` at the free second seat of a waiting match and starts it.
    ///
    /// Returns the seat the identity now holds (also when already seated).
    ///
    /// # Errors
    ///
    /// [`GameError::MatchFull`] when both seats belong to someone else.
    #[instrument(skip(self, skills), fields(match_id = %self.id))]
    pub fn claim_seat(
        &mut self,
        identity: &str,
        skills: Vec<SkillSlot>,
        now: DateTime<Utc>,
    ) -> Result<Player, GameError> {
        if let Some(seat) = self.seat_of(identity) {
            return Ok(seat);
        }
        if self.player2.is_some() {
            return Err(GameError::MatchFull);
        }

        self.player2 = Some(PlayerSlot::new(identity, Player::White, skills));
        self.status = MatchStatus::InProgress;
        self.started_at = Some(now);
        info!(identity, "Second seat claimed, match started");
        Ok(Player::White)
    }

    /// Rejects anything but an in-progress match.
    pub fn ensure_in_progress(&self) -> Result<(), GameError> {
        match self.status {
            MatchStatus::InProgress => Ok(()),
            MatchStatus::Waiting => Err(GameError::MatchNotStarted),
            MatchStatus::Finished => Err(GameError::GameAlreadyFinished),
        }
    }

    /// Rejects a player acting out of turn.
    pub fn ensure_turn(&self, player: Player) -> Result<(), GameError> {
        if player != self.current_player {
            return Err(GameError::NotYourTurn { player });
        }
        Ok(())
    }

    /// Full legality check for `player` placing at `(row, col)`: board
    /// rules plus any forced area binding that player.
    pub fn validate_placement(
        &self,
        player: Player,
        row: i32,
        col: i32,
        now: DateTime<Utc>,
    ) -> Result<Coord, GameError> {
        let at = validate_move(&self.board, row, col, &self.sealed_cells)?;
        if let Some(area) = self.binding_forced_area(player, now)
            && !area.bounds().contains(at)
        {
            return Err(GameError::OutsideForcedArea {
                at,
                center: area.center,
            });
        }
        Ok(at)
    }

    /// The forced area restricting `player` at `now`. An area with no
    /// empty, unsealed cell left restricts nobody.
    pub fn binding_forced_area(&self, player: Player, now: DateTime<Utc>) -> Option<ForcedArea> {
        self.forced_area.filter(|area| {
            area.binds(player, now)
                && Coord::all()
                    .filter(|at| area.bounds().contains(*at))
                    .any(|at| self.board.is_empty(at) && !self.sealed_cells.contains(&at))
        })
    }

    /// Cells `player` may not play on right now: sealed cells and, under
    /// a binding forced area, everything outside it.
    pub fn blocked_cells_for(&self, player: Player, now: DateTime<Utc>) -> BTreeSet<Coord> {
        let mut blocked = self.sealed_cells.clone();
        if let Some(area) = self.binding_forced_area(player, now) {
            let bounds = area.bounds();
            blocked.extend(Coord::all().filter(|at| !bounds.contains(*at)));
        }
        blocked
    }

    /// Whether an unexpired effect of `skill` applies to `target`.
    pub fn has_effect(&self, skill: SkillId, target: Player, now: DateTime<Utc>) -> bool {
        self.active_effects
            .iter()
            .any(|e| e.skill == skill && e.target == target && e.is_active(now))
    }

    /// Puts a stone on the board and logs it. Legality is the caller's job.
    pub(crate) fn place_stone(
        &mut self,
        player: Player,
        at: Coord,
        skill_used: Option<SkillId>,
        now: DateTime<Utc>,
    ) {
        self.board.set(at, Cell::Stone(player));
        self.move_log.push(MoveRecord {
            player,
            row: at.row,
            col: at.col,
            timestamp: now,
            skill_used,
        });
    }

    /// Win/draw resolution after `player` placed `stones` this turn.
    ///
    /// Finishes the match on a win or draw; otherwise hands the turn over.
    pub(crate) fn resolve_turn(
        &mut self,
        player: Player,
        stones: &[Coord],
        now: DateTime<Utc>,
    ) -> TurnResult {
        if let Some(line) = stones
            .iter()
            .find_map(|at| check_win(&self.board, *at, player))
        {
            self.win_line = Some(line.clone());
            self.finish(Winner::Player(player), FinishReason::FiveInARow, now);
            return TurnResult::Won {
                winner: player,
                line,
            };
        }

        if check_draw(&self.board) {
            self.finish(Winner::Draw, FinishReason::Draw, now);
            return TurnResult::Draw;
        }

        self.end_turn(player);
        TurnResult::Continue
    }

    /// Passes the turn from `player` to the opponent.
    fn end_turn(&mut self, player: Player) {
        if self.forced_area.is_some_and(|a| a.target == player) {
            self.forced_area = None;
        }
        self.turns_played += 1;
        let turn = self.turns_played;
        self.transparent_cells.retain(|t| t.reveal_at_turn > turn);
        self.current_player = player.opponent();
    }

    /// Validates and plays a regular move.
    ///
    /// # Errors
    ///
    /// State errors ([`GameError::GameAlreadyFinished`], [`GameError::MatchNotStarted`],
    /// [`GameError::NotYourTurn`]) and legality errors. Nothing changes on error.
    #[instrument(skip(self, now), fields(match_id = %self.id))]
    pub fn submit_move(
        &mut self,
        player: Player,
        row: i32,
        col: i32,
        now: DateTime<Utc>,
    ) -> Result<TurnResult, GameError> {
        self.ensure_in_progress()?;
        self.ensure_turn(player)?;
        let at = self.validate_placement(player, row, col, now)?;

        self.place_stone(player, at, None, now);
        let result = self.resolve_turn(player, &[at], now);
        debug!(%player, %at, ?result, "Move applied");
        Ok(result)
    }

    /// Concedes the match for `player`.
    #[instrument(skip(self, now), fields(match_id = %self.id))]
    pub fn surrender(&mut self, player: Player, now: DateTime<Utc>) -> Result<Player, GameError> {
        self.ensure_in_progress()?;
        let winner = player.opponent();
        self.finish(Winner::Player(winner), FinishReason::Surrender, now);
        Ok(winner)
    }

    /// Marks the match finished.
    pub(crate) fn finish(&mut self, winner: Winner, reason: FinishReason, now: DateTime<Utc>) {
        assert_ne!(
            self.status,
            MatchStatus::Finished,
            "match {} finished twice",
            self.id
        );
        self.status = MatchStatus::Finished;
        self.winner = Some(winner);
        self.finish_reason = Some(reason);
        self.finished_at = Some(now);
        self.duration_secs = Some((now - self.started_at.unwrap_or(self.created_at)).num_seconds());
        info!(match_id = %self.id, ?winner, %reason, "Match finished");
    }
}
