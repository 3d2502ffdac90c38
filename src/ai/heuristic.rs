//! Move selection.

use super::Difficulty;
use crate::games::gomoku::{
    Board, CENTER, Cell, Coord, Player, apply_move, check_win, evaluate_position, forms_open_four,
};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Weight of the opponent's score at a candidate cell.
const DEFENSE_WEIGHT: f64 = 0.8;
/// Subtracted when a candidate lets the opponent win next move.
const LOOKAHEAD_PENALTY: f64 = 1000.0;
/// Candidates lie within this Chebyshev distance of an existing stone.
const CANDIDATE_RADIUS: usize = 2;

/// Chooses a cell for `ai` to play, or `None` when no legal cell exists.
///
/// `blocked` holds every empty cell the AI may not use (sealed cells and,
/// under a forced area, everything outside it). Steps, first match wins:
///
/// 1. a cell that wins immediately
/// 2. a cell where the opponent would win
/// 3. with probability [`Difficulty::random_chance`], a uniformly random legal cell
/// 4. a cell making an open four
/// 5. a cell where the opponent would make an open four
/// 6. the best heuristic candidate near existing stones (the center on an
///    empty board), ties going to the first in row-major order
///
/// Every scan is row-major, so apart from step 3 the choice is deterministic.
#[instrument(skip(board, blocked, rng))]
pub fn choose_move(
    board: &Board,
    ai: Player,
    difficulty: Difficulty,
    blocked: &BTreeSet<Coord>,
    rng: &mut impl Rng,
) -> Option<Coord> {
    let opponent = ai.opponent();
    let legal: Vec<Coord> = Coord::all()
        .filter(|at| board.is_empty(*at) && !blocked.contains(at))
        .collect();
    if legal.is_empty() {
        debug!("No legal cell");
        return None;
    }

    if let Some(at) = first_where(&legal, |at| check_win(board, at, ai).is_some()) {
        debug!(%at, "Taking win");
        return Some(at);
    }
    if let Some(at) = first_where(&legal, |at| check_win(board, at, opponent).is_some()) {
        debug!(%at, "Blocking win");
        return Some(at);
    }
    if rng.gen_bool(difficulty.random_chance()) {
        let at = legal.choose(rng).copied();
        debug!(?at, "Playing randomly");
        return at;
    }
    if let Some(at) = first_where(&legal, |at| forms_open_four(board, at, ai)) {
        debug!(%at, "Making open four");
        return Some(at);
    }
    if let Some(at) = first_where(&legal, |at| forms_open_four(board, at, opponent)) {
        debug!(%at, "Blocking open four");
        return Some(at);
    }

    let best = best_candidate(board, ai, difficulty, &legal);
    debug!(?best, "Heuristic choice");
    best.or_else(|| legal.choose(rng).copied())
}

fn first_where(cells: &[Coord], mut pred: impl FnMut(Coord) -> bool) -> Option<Coord> {
    cells.iter().copied().find(|at| pred(*at))
}

/// Legal cells near a stone, or the center of an empty board.
fn candidates(board: &Board, legal: &[Coord]) -> Vec<Coord> {
    let stones: Vec<Coord> = Coord::all().filter(|at| !board.is_empty(*at)).collect();
    if stones.is_empty() {
        return legal.iter().copied().filter(|at| *at == CENTER).collect();
    }
    legal
        .iter()
        .copied()
        .filter(|at| stones.iter().any(|s| s.chebyshev(*at) <= CANDIDATE_RADIUS))
        .collect()
}

fn score(board: &Board, at: Coord, ai: Player, difficulty: Difficulty) -> f64 {
    let opponent = ai.opponent();
    let attack = evaluate_position(board, at, ai) as f64;
    let defense = evaluate_position(board, at, opponent) as f64;
    let center_bonus = (14 - at.manhattan(CENTER) as i64) as f64 * 2.0;
    let mut score = attack - DEFENSE_WEIGHT * defense + center_bonus;

    if difficulty.depth() > 1 {
        let after = apply_move(board, at, ai);
        let opponent_wins = Coord::all()
            .filter(|c| after.get(*c) == Cell::Empty)
            .any(|c| check_win(&after, c, opponent).is_some());
        if opponent_wins {
            score -= LOOKAHEAD_PENALTY;
        }
    }
    score
}

fn best_candidate(board: &Board, ai: Player, difficulty: Difficulty, legal: &[Coord]) -> Option<Coord> {
    let mut best: Option<(Coord, f64)> = None;
    for at in candidates(board, legal) {
        let s = score(board, at, ai, difficulty);
        if best.is_none_or(|(_, b)| s > b) {
            best = Some((at, s));
        }
    }
    best.map(|(at, _)| at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    /// `gen_bool` never fires: the random step is skipped.
    fn never_random() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    /// `gen_bool` always fires and `choose` picks the first cell.
    fn always_random() -> StepRng {
        StepRng::new(0, 0)
    }

    fn board_with(stones: &[(usize, usize, Player)]) -> Board {
        let mut board = Board::new();
        for &(row, col, player) in stones {
            board.set(Coord::new(row, col), Cell::Stone(player));
        }
        board
    }

    #[test]
    fn test_first_move_is_center() {
        let none = BTreeSet::new();
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(
                choose_move(&Board::new(), Player::Black, difficulty, &none, &mut never_random()),
                Some(CENTER)
            );
        }
    }

    #[test]
    fn test_first_move_center_rate_tracks_difficulty() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        const GAMES: usize = 2000;
        let none = BTreeSet::new();
        let board = Board::new();
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let mut rng = StdRng::seed_from_u64(17);
            let centered = (0..GAMES)
                .filter(|_| {
                    choose_move(&board, Player::Black, difficulty, &none, &mut rng) == Some(CENTER)
                })
                .count();
            let rate = centered as f64 / GAMES as f64;
            // A random pick can land on the center too.
            let chance = difficulty.random_chance();
            let expected = (1.0 - chance) + chance / 225.0;
            assert!(
                (rate - expected).abs() < 0.04,
                "{difficulty}: center rate {rate}, expected about {expected}"
            );
        }
    }

    #[test]
    fn test_random_branch_picks_legal_cell() {
        assert_eq!(
            choose_move(
                &Board::new(),
                Player::Black,
                Difficulty::Easy,
                &BTreeSet::new(),
                &mut always_random()
            ),
            Some(Coord::new(0, 0))
        );
    }

    #[test]
    fn test_blocks_open_four_in_scan_order() {
        let board = board_with(&[
            (7, 5, Player::White),
            (7, 6, Player::White),
            (7, 7, Player::White),
            (7, 8, Player::White),
        ]);
        let choice = choose_move(
            &board,
            Player::Black,
            Difficulty::Hard,
            &BTreeSet::new(),
            &mut never_random(),
        );
        assert_eq!(choice, Some(Coord::new(7, 4)));
    }

    #[test]
    fn test_open_four_block_survives_random_roll() {
        // Both ends win for White, so the block happens before any dice roll.
        let board = board_with(&[
            (7, 5, Player::White),
            (7, 6, Player::White),
            (7, 7, Player::White),
            (7, 8, Player::White),
        ]);
        let choice = choose_move(
            &board,
            Player::Black,
            Difficulty::Easy,
            &BTreeSet::new(),
            &mut always_random(),
        );
        assert!(matches!(choice, Some(c) if c == Coord::new(7, 4) || c == Coord::new(7, 9)));
    }

    #[test]
    fn test_takes_win_over_block() {
        let board = board_with(&[
            (0, 0, Player::Black),
            (0, 1, Player::Black),
            (0, 2, Player::Black),
            (0, 3, Player::Black),
            (5, 0, Player::White),
            (5, 1, Player::White),
            (5, 2, Player::White),
            (5, 3, Player::White),
        ]);
        let choice = choose_move(
            &board,
            Player::White,
            Difficulty::Medium,
            &BTreeSet::new(),
            &mut never_random(),
        );
        assert_eq!(choice, Some(Coord::new(5, 4)));
    }

    #[test]
    fn test_never_plays_blocked_cell() {
        let board = board_with(&[
            (5, 0, Player::White),
            (5, 1, Player::White),
            (5, 2, Player::White),
            (5, 3, Player::White),
        ]);
        let blocked: BTreeSet<Coord> = [Coord::new(5, 4)].into();
        let choice = choose_move(
            &board,
            Player::White,
            Difficulty::Hard,
            &blocked,
            &mut never_random(),
        );
        assert_ne!(choice, Some(Coord::new(5, 4)));
        assert!(choice.is_some_and(|c| board.is_empty(c)));
    }

    #[test]
    fn test_makes_open_four() {
        let board = board_with(&[
            (7, 5, Player::Black),
            (7, 6, Player::Black),
            (7, 7, Player::Black),
        ]);
        let choice = choose_move(
            &board,
            Player::Black,
            Difficulty::Hard,
            &BTreeSet::new(),
            &mut never_random(),
        );
        assert_eq!(choice, Some(Coord::new(7, 4)));
    }

    #[test]
    fn test_full_board_has_no_move() {
        let mut board = Board::new();
        for at in Coord::all() {
            let black = (at.col / 2 + at.row) % 2 == 0;
            let player = if black { Player::Black } else { Player::White };
            board.set(at, Cell::Stone(player));
        }
        assert_eq!(
            choose_move(
                &board,
                Player::Black,
                Difficulty::Easy,
                &BTreeSet::new(),
                &mut always_random()
            ),
            None
        );
    }
}
