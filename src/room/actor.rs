//! The room actor: sole owner of one match while it is live.

use super::events::ServerEvent;
use crate::ai::{Difficulty, choose_move};
use crate::error::GameError;
use crate::games::gomoku::{Coord, Player};
use crate::matches::{
    FinishReason, Identity, InvariantSet, Match, MatchInvariants, MatchMode, MatchStatus, MatchType,
    MatchView, Winner,
};
use crate::skills::{SkillAction, SkillEffect, SkillId, SkillParams, draw_loadout, use_skill};
use crate::store::{MatchStore, SnapshotFlusher};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

/// Identifies one connection for the lifetime of the process.
pub type SessionId = u64;

/// Requests handled by a room, each answered on its own reply channel.
#[derive(Debug)]
pub(crate) enum Command {
    Join {
        session: SessionId,
        identity: Identity,
        outbox: mpsc::Sender<ServerEvent>,
        reply: oneshot::Sender<Result<Player, GameError>>,
    },
    Leave {
        session: SessionId,
        reply: oneshot::Sender<()>,
    },
    Move {
        session: SessionId,
        player: Player,
        row: i32,
        col: i32,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Skill {
        session: SessionId,
        player: Player,
        skill: String,
        params: SkillParams,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Surrender {
        session: SessionId,
        player: Player,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Match>,
    },
}

/// Something every member should hear about after an accepted event.
#[derive(Debug, Clone)]
enum Notice {
    Joined { identity: Identity, seat: Player },
    Left { identity: Identity },
    Moved { at: Coord, player: Player },
    Skill { skill: SkillId, player: Player, effect: SkillEffect },
    State,
    Over,
}

#[derive(Debug)]
struct Member {
    identity: Identity,
    outbox: mpsc::Sender<ServerEvent>,
}

/// Runs when the room shuts down, after the final snapshot is written.
pub(crate) type OnEvict = Box<dyn FnOnce() + Send>;

pub(crate) struct RoomActor {
    game: Match,
    members: BTreeMap<SessionId, Member>,
    store: Arc<dyn MatchStore>,
    flusher: SnapshotFlusher,
    idle_timeout: Duration,
    default_difficulty: Difficulty,
    rng: StdRng,
    rx: mpsc::Receiver<Command>,
    on_evict: OnEvict,
}

impl RoomActor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        game: Match,
        store: Arc<dyn MatchStore>,
        flusher: SnapshotFlusher,
        idle_timeout: Duration,
        default_difficulty: Difficulty,
        rng: StdRng,
        rx: mpsc::Receiver<Command>,
        on_evict: OnEvict,
    ) -> Self {
        Self {
            game,
            members: BTreeMap::new(),
            store,
            flusher,
            idle_timeout,
            default_difficulty,
            rng,
            rx,
            on_evict,
        }
    }

    /// Processes commands one at a time until the room is evicted.
    #[instrument(skip(self), fields(match_id = %self.game.id))]
    pub(crate) async fn run(mut self) {
        info!(status = %self.game.status, "Room opened");
        loop {
            let next = if self.members.is_empty() {
                match tokio::time::timeout(self.idle_timeout, self.rx.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        info!("Room idle, evicting");
                        break;
                    }
                }
            } else {
                self.rx.recv().await
            };

            let Some(command) = next else {
                debug!("All handles dropped");
                break;
            };
            if self.handle(command).await {
                break;
            }
        }
        self.shutdown().await;
    }

    /// Writes the final snapshot, then leaves the registry. Commands still
    /// queued are dropped, so their senders see the room as gone.
    async fn shutdown(self) {
        let RoomActor {
            game,
            rx,
            flusher,
            on_evict,
            ..
        } = self;
        if let Err(e) = flusher.close().await {
            error!(match_id = %game.id, error = %e, "Final snapshot flush failed");
        }
        on_evict();
        drop(rx);
        info!(match_id = %game.id, status = %game.status, "Room evicted");
    }

    /// Handles one command. Returns `true` when the room should close.
    async fn handle(&mut self, command: Command) -> bool {
        let now = Utc::now();
        match command {
            Command::Join {
                session,
                identity,
                outbox,
                reply,
            } => {
                let result = self.join(session, identity, outbox, now).await;
                let _ = reply.send(result);
                false
            }
            Command::Leave { session, reply } => {
                self.leave(session, now);
                let _ = reply.send(());
                self.should_evict()
            }
            Command::Move {
                session,
                player,
                row,
                col,
                reply,
            } => {
                let result = self
                    .step(session, player, now, |game| {
                        game.submit_move(player, row, col, now)?;
                        let at = Coord::from_signed(row, col).ok_or(GameError::OutOfBounds { row, col })?;
                        Ok(vec![Notice::Moved { at, player }])
                    })
                    .await;
                let _ = reply.send(result);
                self.should_evict()
            }
            Command::Skill {
                session,
                player,
                skill,
                params,
                reply,
            } => {
                let result = self
                    .step(session, player, now, |game| {
                        let action = SkillAction::parse(&skill, &params)?;
                        let outcome = use_skill(game, player, &action, now)?;
                        Ok(vec![
                            Notice::Skill {
                                skill: action.id(),
                                player,
                                effect: outcome.effect,
                            },
                            Notice::State,
                        ])
                    })
                    .await;
                let _ = reply.send(result);
                self.should_evict()
            }
            Command::Surrender {
                session,
                player,
                reply,
            } => {
                let result = self
                    .step(session, player, now, |game| {
                        game.surrender(player, now)?;
                        Ok(vec![Notice::State])
                    })
                    .await;
                let _ = reply.send(result);
                self.should_evict()
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.game.clone());
                false
            }
        }
    }

    fn should_evict(&self) -> bool {
        self.members.is_empty() && self.game.status == MatchStatus::Finished
    }

    #[instrument(skip(self, outbox, now), fields(match_id = %self.game.id))]
    async fn join(
        &mut self,
        session: SessionId,
        identity: Identity,
        outbox: mpsc::Sender<ServerEvent>,
        now: DateTime<Utc>,
    ) -> Result<Player, GameError> {
        let mut game = self.game.clone();
        let skills = match (game.mode, game.seat_of(&identity)) {
            (MatchMode::Skill, None) => draw_loadout(&mut self.rng),
            _ => Vec::new(),
        };
        let seat = game.claim_seat(&identity, skills, now)?;
        let started = game.status != self.game.status;

        self.commit(game).await?;
        self.members.insert(
            session,
            Member {
                identity: identity.clone(),
                outbox,
            },
        );
        info!(session, identity = %identity, %seat, members = self.members.len(), "Session joined");

        // The joiner gets the snapshot; everyone else hears about the join,
        // plus the new state when it started the match.
        self.deliver(&[Notice::State], now, |s| s == session);
        let mut others = vec![Notice::Joined { identity, seat }];
        if started {
            others.push(Notice::State);
        }
        self.deliver(&others, now, |s| s != session);
        Ok(seat)
    }

    fn leave(&mut self, session: SessionId, now: DateTime<Utc>) {
        let Some(member) = self.members.remove(&session) else {
            debug!(session, "Leave from a session that was not a member");
            return;
        };
        info!(session, identity = %member.identity, members = self.members.len(), "Session left");
        self.broadcast(
            &[Notice::Left {
                identity: member.identity,
            }],
            now,
        );
    }

    /// Checks that `session` may act for `player`.
    fn authorize(&self, session: SessionId, player: Player) -> Result<(), GameError> {
        let member = self
            .members
            .get(&session)
            .ok_or(GameError::NotYourTurn { player })?;
        match (self.game.match_type, self.game.seat_of(&member.identity)) {
            (MatchType::LocalPvP, Some(_)) => Ok(()),
            (_, Some(seat)) if seat == player => Ok(()),
            _ => Err(GameError::NotYourTurn { player }),
        }
    }

    /// One serialized mutation: apply `op` to a copy of the match, let the
    /// AI answer, archive a finish, then commit and broadcast. On any error
    /// the live match is untouched and nothing is broadcast.
    async fn step<F>(
        &mut self,
        session: SessionId,
        player: Player,
        now: DateTime<Utc>,
        op: F,
    ) -> Result<(), GameError>
    where
        F: FnOnce(&mut Match) -> Result<Vec<Notice>, GameError>,
    {
        self.authorize(session, player)?;

        let mut game = self.game.clone();
        let mut notices = op(&mut game).inspect_err(|e| {
            debug!(session, %player, code = e.code(), "Event rejected");
        })?;
        self.play_ai(&mut game, now, &mut notices);

        if self.commit(game).await? {
            notices.push(Notice::Over);
        }
        self.broadcast(&notices, now);
        Ok(())
    }

    /// Lets the AI seat move for as long as it is on turn.
    fn play_ai(&mut self, game: &mut Match, now: DateTime<Utc>, notices: &mut Vec<Notice>) {
        while game.is_ai_turn() {
            let ai = game.current_player;
            let difficulty = game.ai_difficulty.unwrap_or(self.default_difficulty);
            let blocked = game.blocked_cells_for(ai, now);

            match choose_move(&game.board, ai, difficulty, &blocked, &mut self.rng) {
                Some(at) => {
                    if let Err(e) = game.submit_move(ai, at.row as i32, at.col as i32, now) {
                        panic!("AI chose an illegal move {} in match {}: {}", at, game.id, e);
                    }
                    notices.push(Notice::Moved { at, player: ai });
                }
                None => {
                    warn!(match_id = %game.id, "AI has no legal move, declaring a draw");
                    game.finish(Winner::Draw, FinishReason::NoLegalMoves, now);
                    notices.push(Notice::State);
                }
            }
        }
    }

    /// Makes `game` the live match. A newly finished match is archived
    /// first; if that fails nothing changes. Returns whether this commit
    /// finished the match.
    async fn commit(&mut self, game: Match) -> Result<bool, GameError> {
        let finishes = game.status == MatchStatus::Finished && self.game.status != MatchStatus::Finished;
        if finishes {
            let record = self.store.append_record(&game).await.inspect_err(|e| {
                error!(match_id = %game.id, error = %e, "Archiving failed, event rejected");
            })?;
            info!(match_id = %game.id, result = %record.result(), "Match archived");
        }

        if let Err(violations) = MatchInvariants::check_all(&game) {
            panic!("match {} violates invariants: {:?}", game.id, violations);
        }

        self.game = game;
        self.flusher.publish(&self.game);
        Ok(finishes)
    }

    /// Sends `notices` to every member, rendered for that member.
    fn broadcast(&mut self, notices: &[Notice], now: DateTime<Utc>) {
        self.deliver(notices, now, |_| true);
    }

    /// Sends `notices` to the members `to` selects. Never waits: a full
    /// outbox loses the event, a closed one loses the member.
    fn deliver(&mut self, notices: &[Notice], now: DateTime<Utc>, to: impl Fn(SessionId) -> bool) {
        let mut closed = Vec::new();
        for (session, member) in self.members.iter().filter(|(s, _)| to(**s)) {
            for notice in notices {
                let event = render(&self.game, notice, &member.identity, now);
                match member.outbox.try_send(event) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!(session, identity = %member.identity, "Outbox full, event dropped");
                    }
                    Err(TrySendError::Closed(_)) => {
                        closed.push(*session);
                        break;
                    }
                }
            }
        }
        for session in closed {
            if let Some(member) = self.members.remove(&session) {
                info!(session, identity = %member.identity, "Session gone, removed from room");
            }
        }
    }
}

fn render(game: &Match, notice: &Notice, identity: &str, now: DateTime<Utc>) -> ServerEvent {
    let match_id = game.id.clone();
    match notice {
        Notice::Joined { identity, seat } => ServerEvent::PlayerJoined {
            match_id,
            identity: identity.clone(),
            seat: Some(*seat),
        },
        Notice::Left { identity } => ServerEvent::PlayerLeft {
            match_id,
            identity: identity.clone(),
        },
        Notice::Moved { at, player } => ServerEvent::MoveResult {
            match_id,
            row: at.row,
            col: at.col,
            player: *player,
            board: MatchView::for_identity(game, identity, now).board,
            current_player: game.current_player,
        },
        Notice::Skill {
            skill,
            player,
            effect,
        } => ServerEvent::SkillEffect {
            match_id,
            skill_id: *skill,
            player: *player,
            effect: effect.clone(),
        },
        Notice::State => ServerEvent::GameState(MatchView::for_identity(game, identity, now)),
        Notice::Over => ServerEvent::GameOver {
            match_id,
            winner: game.winner.unwrap_or(Winner::Draw),
            win_line: game.win_line.clone(),
            reason: game.finish_reason.unwrap_or(FinishReason::Draw),
        },
    }
}
