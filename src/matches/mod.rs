//! The match aggregate: one game between two seats, plus skill state.

mod effects;
pub mod invariants;
mod model;
mod view;

pub use effects::{ActiveEffect, AreaBounds, ForcedArea, TransparentStone};
pub use invariants::{Invariant, InvariantSet, InvariantViolation, MatchInvariants};
pub use model::{
    AI_IDENTITY, FinishReason, Identity, Match, MatchId, MatchMode, MatchStatus, MatchType,
    MoveRecord, PlayerSlot, TurnResult, Winner,
};
pub use view::MatchView;
