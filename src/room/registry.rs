//! Live rooms, keyed by match id.

use super::actor::{Command, RoomActor, SessionId};
use super::events::{ClientEvent, ServerEvent};
use crate::ai::Difficulty;
use crate::error::GameError;
use crate::games::gomoku::Player;
use crate::matches::{Identity, Match, MatchId};
use crate::skills::SkillParams;
use crate::store::{MatchStore, spawn_flusher};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument};

/// Capacity of each room's command queue.
const COMMAND_BUFFER: usize = 64;

/// Tunables shared by every room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSettings {
    /// How long a room with no members stays live.
    pub idle_timeout: Duration,
    /// AI strength for matches that do not name one.
    pub default_difficulty: Difficulty,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(600),
            default_difficulty: Difficulty::Medium,
        }
    }
}

/// Sends commands to one room. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    match_id: MatchId,
    tx: mpsc::Sender<Command>,
}

impl RoomHandle {
    /// The room's match id.
    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    /// Whether the room has shut down.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn gone(&self) -> GameError {
        GameError::GameNotFound {
            match_id: self.match_id.to_string(),
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, GameError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).await.map_err(|_| self.gone())?;
        rx.await.map_err(|_| self.gone())
    }

    /// Attaches a session, claiming the free seat of a waiting match.
    /// Events for the session are pushed to `outbox`.
    pub async fn join(
        &self,
        session: SessionId,
        identity: impl Into<Identity>,
        outbox: mpsc::Sender<ServerEvent>,
    ) -> Result<Player, GameError> {
        let identity = identity.into();
        self.request(|reply| Command::Join {
            session,
            identity,
            outbox,
            reply,
        })
        .await?
    }

    /// Detaches a session.
    pub async fn leave(&self, session: SessionId) -> Result<(), GameError> {
        self.request(|reply| Command::Leave { session, reply }).await
    }

    /// Places a stone for `player`.
    pub async fn submit_move(
        &self,
        session: SessionId,
        player: Player,
        row: i32,
        col: i32,
    ) -> Result<(), GameError> {
        self.request(|reply| Command::Move {
            session,
            player,
            row,
            col,
            reply,
        })
        .await?
    }

    /// Uses a skill for `player`.
    pub async fn submit_skill(
        &self,
        session: SessionId,
        player: Player,
        skill: impl Into<String>,
        params: SkillParams,
    ) -> Result<(), GameError> {
        let skill = skill.into();
        self.request(|reply| Command::Skill {
            session,
            player,
            skill,
            params,
            reply,
        })
        .await?
    }

    /// Concedes for `player`.
    pub async fn surrender(&self, session: SessionId, player: Player) -> Result<(), GameError> {
        self.request(|reply| Command::Surrender {
            session,
            player,
            reply,
        })
        .await?
    }

    /// A copy of the live match.
    pub async fn snapshot(&self) -> Result<Match, GameError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }
}

#[derive(Debug)]
struct RoomEntry {
    handle: RoomHandle,
    generation: u64,
}

/// Registry of live rooms. Each room is an actor task owning its match;
/// the registry only maps ids to handles.
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<MatchId, RoomEntry>>>,
    store: Arc<dyn MatchStore>,
    settings: RoomSettings,
    generations: Arc<AtomicU64>,
    sessions: Arc<AtomicU64>,
}

impl RoomRegistry {
    /// Creates an empty registry over `store`.
    pub fn new(store: Arc<dyn MatchStore>, settings: RoomSettings) -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            store,
            settings,
            generations: Arc::new(AtomicU64::new(0)),
            sessions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The store rooms flush to.
    pub fn store(&self) -> &Arc<dyn MatchStore> {
        &self.store
    }

    /// Allocates a session id for a new connection.
    pub fn new_session(&self) -> SessionId {
        self.sessions.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Starts a room for a new match.
    #[instrument(skip(self, game), fields(match_id = %game.id))]
    pub fn open(&self, game: Match) -> RoomHandle {
        let mut rooms = self.lock();
        if let Some(entry) = rooms.get(&game.id).filter(|e| !e.handle.is_closed()) {
            debug!("Room already live");
            return entry.handle.clone();
        }
        self.spawn_room(&mut rooms, game)
    }

    /// The live room for `id`, reviving it from the store when necessary.
    ///
    /// # Errors
    ///
    /// [`GameError::GameNotFound`] if the match is neither live nor stored,
    /// [`GameError::Store`] if loading fails.
    #[instrument(skip(self))]
    pub async fn room(&self, id: &MatchId) -> Result<RoomHandle, GameError> {
        if let Some(handle) = self.live(id) {
            return Ok(handle);
        }

        let game = self.store.load(id).await?.ok_or_else(|| GameError::GameNotFound {
            match_id: id.to_string(),
        })?;
        info!(status = %game.status, "Reviving room from store");
        Ok(self.open(game))
    }

    /// The live room for `id`, if any.
    pub fn live(&self, id: &MatchId) -> Option<RoomHandle> {
        self.lock()
            .get(id)
            .map(|entry| entry.handle.clone())
            .filter(|handle| !handle.is_closed())
    }

    /// Number of live rooms.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    /// Joins a session to a room. A room that shuts down between lookup
    /// and delivery is revived once.
    #[instrument(skip(self, outbox))]
    pub async fn join(
        &self,
        id: &MatchId,
        session: SessionId,
        identity: &str,
        outbox: mpsc::Sender<ServerEvent>,
    ) -> Result<Player, GameError> {
        let handle = self.room(id).await?;
        match handle.join(session, identity, outbox.clone()).await {
            Err(GameError::GameNotFound { .. }) if handle.is_closed() => {
                debug!("Room closed during join, retrying");
                self.room(id).await?.join(session, identity, outbox).await
            }
            result => result,
        }
    }

    /// Routes one session event to its room.
    #[instrument(skip(self, event, outbox), fields(match_id = %event.match_id()))]
    pub async fn dispatch(
        &self,
        session: SessionId,
        identity: &str,
        event: ClientEvent,
        outbox: &mpsc::Sender<ServerEvent>,
    ) -> Result<(), GameError> {
        match event {
            ClientEvent::JoinGame { match_id } => self
                .join(&match_id, session, identity, outbox.clone())
                .await
                .map(|_| ()),
            ClientEvent::MakeMove {
                match_id,
                row,
                col,
                player,
            } => {
                self.room(&match_id)
                    .await?
                    .submit_move(session, player, row, col)
                    .await
            }
            ClientEvent::UseSkill {
                match_id,
                skill_id,
                player,
                params,
            } => {
                self.room(&match_id)
                    .await?
                    .submit_skill(session, player, skill_id, params)
                    .await
            }
            ClientEvent::Surrender { match_id, player } => {
                self.room(&match_id).await?.surrender(session, player).await
            }
            ClientEvent::LeaveGame { match_id } => match self.live(&match_id) {
                Some(handle) => handle.leave(session).await,
                None => Ok(()),
            },
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<MatchId, RoomEntry>> {
        self.rooms.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn spawn_room(&self, rooms: &mut HashMap<MatchId, RoomEntry>, game: Match) -> RoomHandle {
        let id = game.id.clone();
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = RoomHandle {
            match_id: id.clone(),
            tx,
        };

        let registry = Arc::clone(&self.rooms);
        let evict_id = id.clone();
        let on_evict = Box::new(move || {
            let mut rooms = registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if rooms.get(&evict_id).is_some_and(|e| e.generation == generation) {
                rooms.remove(&evict_id);
            }
        });

        let flusher = spawn_flusher(Arc::clone(&self.store), game.clone());
        let actor = RoomActor::new(
            game,
            Arc::clone(&self.store),
            flusher,
            self.settings.idle_timeout,
            self.settings.default_difficulty,
            StdRng::from_entropy(),
            rx,
            on_evict,
        );
        tokio::spawn(actor.run());

        rooms.insert(
            id,
            RoomEntry {
                handle: handle.clone(),
                generation,
            },
        );
        handle
    }
}
