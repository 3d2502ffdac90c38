//! One variant per skill, each validating and applying itself.

use super::engine::{BLIND_SECS, FORCE_MOVE_SECS, SHIELD_SECS};
use super::kind::SkillId;
use super::loadout::SkillSlot;
use crate::error::GameError;
use crate::games::gomoku::{Board, Coord, Player};
use crate::matches::{ActiveEffect, AreaBounds, ForcedArea, Match, TransparentStone, TurnResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// A cell named in skill parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellParam {
    /// Row.
    pub row: i32,
    /// Column.
    pub col: i32,
}

/// Skill parameters as they arrive on the wire. Which fields matter
/// depends on the skill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillParams {
    /// Chain-move targets.
    #[serde(default)]
    pub moves: Vec<CellParam>,
    /// Target row (x-ray, remove).
    pub row: Option<i32>,
    /// Target column (x-ray, remove).
    pub col: Option<i32>,
    /// Area center row (force-move, seal).
    pub center_row: Option<i32>,
    /// Area center column (force-move, seal).
    pub center_col: Option<i32>,
}

impl SkillParams {
    fn cell(&self) -> Option<(i32, i32)> {
        Some((self.row?, self.col?))
    }

    fn center(&self) -> Option<(i32, i32)> {
        Some((self.center_row?, self.center_col?))
    }
}

/// A fully specified skill invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillAction {
    /// Two stones, Chebyshev distance above one.
    ChainMove {
        /// First target `(row, col)`.
        first: (i32, i32),
        /// Second target `(row, col)`.
        second: (i32, i32),
    },
    /// A stone hidden from the opponent.
    XRay {
        /// Target `(row, col)`.
        at: (i32, i32),
    },
    /// Confine the opponent's next move.
    ForceMove {
        /// Area center `(row, col)`.
        center: (i32, i32),
    },
    /// Swap all stone colors.
    Swap,
    /// Seal the empty cells around a center.
    Seal {
        /// Area center `(row, col)`.
        center: (i32, i32),
    },
    /// Take one opponent stone off the board.
    Remove {
        /// Target `(row, col)`.
        at: (i32, i32),
    },
    /// Timed immunity to disruptive skills.
    Shield,
    /// Look at the opponent's loadout.
    Prophecy,
    /// Clear the board.
    Clear,
    /// Timed one-color rendering for the opponent.
    Blind,
}

/// What a skill did, as broadcast to the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SkillEffect {
    /// Two stones placed.
    ChainMove {
        /// The stones, in placement order.
        stones: Vec<Coord>,
    },
    /// A hidden stone was placed somewhere.
    XRay,
    /// The opponent is confined.
    ForceMove {
        /// Clamped area bounds.
        area: AreaBounds,
        /// Confined player.
        target: Player,
        /// End of the restriction.
        expires_at: DateTime<Utc>,
    },
    /// Colors swapped.
    Swap {
        /// Player to move after the swap.
        current_player: Player,
    },
    /// Cells sealed.
    Seal {
        /// Newly sealed cells.
        sealed: Vec<Coord>,
    },
    /// Stone removed.
    Remove {
        /// Where it was.
        removed: Coord,
    },
    /// Shield raised.
    Shield {
        /// End of the immunity.
        expires_at: DateTime<Utc>,
    },
    /// Opponent loadout revealed.
    Prophecy {
        /// Opponent's skills and their used flags.
        opponent_skills: Vec<SkillSlot>,
    },
    /// Board cleared.
    Clear,
    /// Opponent blinded.
    Blind {
        /// Affected player.
        target: Player,
        /// End of the effect.
        expires_at: DateTime<Utc>,
    },
}

/// Result of a successful skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillOutcome {
    /// What happened.
    pub effect: SkillEffect,
    /// Turn resolution, for skills that place stones.
    pub turn: Option<TurnResult>,
}

impl SkillOutcome {
    fn effect(effect: SkillEffect) -> Self {
        Self { effect, turn: None }
    }
}

impl SkillAction {
    /// The skill this action invokes.
    pub fn id(&self) -> SkillId {
        match self {
            SkillAction::ChainMove { .. } => SkillId::ChainMove,
            SkillAction::XRay { .. } => SkillId::XRay,
            SkillAction::ForceMove { .. } => SkillId::ForceMove,
            SkillAction::Swap => SkillId::Swap,
            SkillAction::Seal { .. } => SkillId::Seal,
            SkillAction::Remove { .. } => SkillId::Remove,
            SkillAction::Shield => SkillId::Shield,
            SkillAction::Prophecy => SkillId::Prophecy,
            SkillAction::Clear => SkillId::Clear,
            SkillAction::Blind => SkillId::Blind,
        }
    }

    /// Builds an action from a wire skill name and parameters.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownSkill`] for an unrecognised name,
    /// [`GameError::InvalidSkillParams`] when required parameters are missing.
    pub fn parse(name: &str, params: &SkillParams) -> Result<Self, GameError> {
        let skill = SkillId::from_str(name).map_err(|_| GameError::UnknownSkill {
            name: name.to_string(),
        })?;
        Self::from_params(skill, params)
    }

    /// Builds an action for a known skill.
    pub fn from_params(skill: SkillId, params: &SkillParams) -> Result<Self, GameError> {
        let missing = |expected| GameError::InvalidSkillParams { skill, expected };
        let action = match skill {
            SkillId::ChainMove => match params.moves.as_slice() {
                [a, b] => SkillAction::ChainMove {
                    first: (a.row, a.col),
                    second: (b.row, b.col),
                },
                _ => return Err(missing("exactly two moves")),
            },
            SkillId::XRay => SkillAction::XRay {
                at: params.cell().ok_or_else(|| missing("row and col"))?,
            },
            SkillId::ForceMove => SkillAction::ForceMove {
                center: params.center().ok_or_else(|| missing("centerRow and centerCol"))?,
            },
            SkillId::Swap => SkillAction::Swap,
            SkillId::Seal => SkillAction::Seal {
                center: params.center().ok_or_else(|| missing("centerRow and centerCol"))?,
            },
            SkillId::Remove => SkillAction::Remove {
                at: params.cell().ok_or_else(|| missing("row and col"))?,
            },
            SkillId::Shield => SkillAction::Shield,
            SkillId::Prophecy => SkillAction::Prophecy,
            SkillId::Clear => SkillAction::Clear,
            SkillId::Blind => SkillAction::Blind,
        };
        Ok(action)
    }

    /// Validates against `game` and, only if valid, applies the effect.
    ///
    /// Shared preconditions (ownership, prior use, shield) are checked by
    /// [`use_skill`](super::use_skill) before this runs.
    pub(crate) fn apply(
        &self,
        game: &mut Match,
        player: Player,
        now: DateTime<Utc>,
    ) -> Result<SkillOutcome, GameError> {
        let opponent = player.opponent();
        match *self {
            SkillAction::ChainMove { first, second } => chain_move(game, player, first, second, now),
            SkillAction::XRay { at } => x_ray(game, player, at, now),
            SkillAction::ForceMove { center } => {
                let center = on_board(center)?;
                let area = ForcedArea {
                    center,
                    target: opponent,
                    expires_at: now + Duration::seconds(FORCE_MOVE_SECS),
                };
                game.forced_area = Some(area);
                Ok(SkillOutcome::effect(SkillEffect::ForceMove {
                    area: area.bounds(),
                    target: opponent,
                    expires_at: area.expires_at,
                }))
            }
            SkillAction::Swap => {
                game.board.swap_colors();
                game.current_player = game.current_player.opponent();
                Ok(SkillOutcome::effect(SkillEffect::Swap {
                    current_player: game.current_player,
                }))
            }
            SkillAction::Seal { center } => {
                let center = on_board(center)?;
                let sealed: Vec<Coord> = center
                    .square_around(1)
                    .filter(|at| game.board.is_empty(*at))
                    .collect();
                game.sealed_cells.extend(sealed.iter().copied());
                Ok(SkillOutcome::effect(SkillEffect::Seal { sealed }))
            }
            SkillAction::Remove { at } => remove(game, opponent, at),
            SkillAction::Shield => {
                let expires_at = now + Duration::seconds(SHIELD_SECS);
                game.active_effects.push(ActiveEffect {
                    skill: SkillId::Shield,
                    owner: player,
                    target: player,
                    expires_at,
                });
                Ok(SkillOutcome::effect(SkillEffect::Shield { expires_at }))
            }
            SkillAction::Prophecy => {
                let opponent_skills = game
                    .slot(opponent)
                    .map(|slot| slot.skills.clone())
                    .unwrap_or_default();
                Ok(SkillOutcome::effect(SkillEffect::Prophecy { opponent_skills }))
            }
            SkillAction::Clear => {
                game.board = Board::new();
                game.move_log.clear();
                game.transparent_cells.clear();
                game.sealed_cells.clear();
                Ok(SkillOutcome::effect(SkillEffect::Clear))
            }
            SkillAction::Blind => {
                let expires_at = now + Duration::seconds(BLIND_SECS);
                game.active_effects.push(ActiveEffect {
                    skill: SkillId::Blind,
                    owner: player,
                    target: opponent,
                    expires_at,
                });
                Ok(SkillOutcome::effect(SkillEffect::Blind {
                    target: opponent,
                    expires_at,
                }))
            }
        }
    }
}

fn on_board((row, col): (i32, i32)) -> Result<Coord, GameError> {
    Coord::from_signed(row, col).ok_or(GameError::OutOfBounds { row, col })
}

fn chain_move(
    game: &mut Match,
    player: Player,
    first: (i32, i32),
    second: (i32, i32),
    now: DateTime<Utc>,
) -> Result<SkillOutcome, GameError> {
    game.ensure_turn(player)?;
    let a = game.validate_placement(player, first.0, first.1, now)?;
    let b = game.validate_placement(player, second.0, second.1, now)?;
    if a.chebyshev(b) <= 1 {
        return Err(GameError::ChainTooClose {
            first: a,
            second: b,
        });
    }

    game.place_stone(player, a, Some(SkillId::ChainMove), now);
    game.place_stone(player, b, Some(SkillId::ChainMove), now);
    let turn = game.resolve_turn(player, &[a, b], now);
    debug!(%a, %b, ?turn, "Chain move placed");

    Ok(SkillOutcome {
        effect: SkillEffect::ChainMove { stones: vec![a, b] },
        turn: Some(turn),
    })
}

fn x_ray(
    game: &mut Match,
    player: Player,
    (row, col): (i32, i32),
    now: DateTime<Utc>,
) -> Result<SkillOutcome, GameError> {
    game.ensure_turn(player)?;
    let at = game.validate_placement(player, row, col, now)?;

    game.place_stone(player, at, Some(SkillId::XRay), now);
    // Hidden through the opponent's next turn.
    game.transparent_cells.push(TransparentStone {
        at,
        owner: player,
        reveal_at_turn: game.turns_played + 2,
    });
    let turn = game.resolve_turn(player, &[at], now);

    Ok(SkillOutcome {
        effect: SkillEffect::XRay,
        turn: Some(turn),
    })
}

fn remove(game: &mut Match, opponent: Player, target: (i32, i32)) -> Result<SkillOutcome, GameError> {
    let at = on_board(target)?;
    if !game.board.is_stone(at, opponent) {
        return Err(GameError::NotOpponentStone { at });
    }

    game.board.set(at, crate::games::gomoku::Cell::Empty);
    if let Some(index) = game.move_log.iter().rposition(|r| r.at() == at) {
        game.move_log.remove(index);
    }
    game.transparent_cells.retain(|t| t.at != at);

    Ok(SkillOutcome::effect(SkillEffect::Remove { removed: at }))
}
