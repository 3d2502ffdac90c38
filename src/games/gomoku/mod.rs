//! Fifteen-by-fifteen five-in-a-row.
//!
//! The board engine is a set of pure functions over [`Board`]: move
//! legality, win and draw detection, and the positional scoring the AI uses.

mod types;
pub mod rules;

pub use types::{BOARD_SIZE, Board, CENTER, Cell, Coord, Player};
pub use rules::{
    apply_move, check_draw, check_win, evaluate_position, forms_open_four, validate_move,
};
