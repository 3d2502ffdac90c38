//! AI opponent.
//!
//! A priority heuristic rather than a search: take a win, block a loss,
//! sometimes play randomly (by difficulty), make or block an open four, and
//! otherwise pick the best-scoring nearby cell.

mod difficulty;
mod heuristic;

pub use difficulty::Difficulty;
pub use heuristic::choose_move;
