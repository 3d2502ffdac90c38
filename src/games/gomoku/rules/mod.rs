//! Game rules for five-in-a-row.
//!
//! Pure functions over a [`Board`](super::Board). Nothing here owns state;
//! the match aggregate and the AI both call in.

pub mod draw;
pub mod eval;
pub mod legality;
pub mod win;

pub use draw::check_draw;
pub use eval::{evaluate_position, forms_open_four};
pub use legality::{apply_move, validate_move};
pub use win::check_win;

/// The four line directions: horizontal, vertical, and both diagonals.
/// Each is scanned forwards and backwards from the cell in question.
pub(crate) const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
