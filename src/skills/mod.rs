//! Skill engine.
//!
//! Ten one-shot abilities for skill-mode matches. Each skill is one
//! [`SkillAction`] variant; [`use_skill`] checks the shared preconditions
//! (ownership, prior use, the opponent's shield) and then lets the variant
//! validate and apply itself.

mod action;
mod engine;
mod kind;
mod loadout;

pub use action::{SkillAction, SkillEffect, SkillOutcome, SkillParams};
pub use engine::{BLIND_SECS, FORCE_MOVE_SECS, SHIELD_SECS, use_skill};
pub use kind::{SkillCategory, SkillId};
pub use loadout::{LOADOUT_SIZE, SkillSlot, draw_loadout};
