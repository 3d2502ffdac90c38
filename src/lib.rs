//! Skillfive - real-time five-in-a-row with skills
//!
//! A 15x15 five-in-a-row engine with an optional skill variant (ten one-shot
//! abilities such as sealing cells or removing stones), a heuristic AI
//! opponent, and a room coordinator that serializes every match's events
//! and pushes per-participant views to connected sessions.
//!
//! # Architecture
//!
//! - **Games**: board, move legality, win/draw detection, position scoring
//! - **Matches**: the match aggregate and what each participant may see of it
//! - **Skills**: skill loadouts and the skill engine
//! - **AI**: the computer opponent's move choice
//! - **Room**: one actor per live match, plus the registry of live rooms
//! - **Store**: snapshot and finished-match persistence (memory or SQLite)
//! - **HTTP**: websocket sessions and a small JSON API
//!
//! # Example
//!
//! ```no_run
//! use skillfive::{CreateMatch, MatchMode, MatchService, MatchType, MemoryStore, RoomRegistry, RoomSettings};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let registry = RoomRegistry::new(Arc::new(MemoryStore::new()), RoomSettings::default());
//! let service = MatchService::new(registry, Default::default());
//! let game = service.create_match(CreateMatch::new(
//!     MatchMode::Skill,
//!     MatchType::VsAI,
//!     "alice".to_string(),
//!     None,
//!     None,
//! ));
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod ai;
mod config;
mod error;
mod games;
mod http;
mod matches;
mod room;
mod service;
mod skills;
mod store;

// Crate-level exports - Board engine
pub use games::gomoku::{
    BOARD_SIZE, Board, CENTER, Cell, Coord, Player, apply_move, check_draw, check_win,
    evaluate_position, forms_open_four, validate_move,
};

// Crate-level exports - Match aggregate
pub use matches::{
    AI_IDENTITY, ActiveEffect, AreaBounds, FinishReason, ForcedArea, Identity, Invariant,
    InvariantSet, InvariantViolation, Match, MatchId, MatchInvariants, MatchMode, MatchStatus,
    MatchType, MatchView, MoveRecord, PlayerSlot, TransparentStone, TurnResult, Winner,
};

// Crate-level exports - Skill engine
pub use skills::{
    BLIND_SECS, FORCE_MOVE_SECS, LOADOUT_SIZE, SHIELD_SECS, SkillAction, SkillCategory,
    SkillEffect, SkillId, SkillOutcome, SkillParams, SkillSlot, draw_loadout, use_skill,
};

// Crate-level exports - AI opponent
pub use ai::{Difficulty, choose_move};

// Crate-level exports - Room coordinator
pub use room::{ClientEvent, RoomHandle, RoomRegistry, RoomSettings, ServerEvent, SessionId};

// Crate-level exports - Persistence
pub use store::{
    MatchRecord, MatchResult, MatchStore, MemoryStore, SnapshotFlusher, SqliteStore, StoreError,
    spawn_flusher,
};

// Crate-level exports - Services and HTTP
pub use http::{ApiError, AppState, router};
pub use service::{CreateMatch, MatchService};

// Crate-level exports - Configuration and errors
pub use config::{ConfigError, ServerConfig};
pub use error::GameError;
