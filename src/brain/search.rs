//! Searcher seam and a small default searcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece};
use rand::seq::SliceRandom;

/// Everything a searcher needs to pick a move. The board is a copy; a
/// searcher can never touch the live position.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub board: Board,
    pub max_depth: u32,
    pub time_budget: Option<Duration>,
    pub random_opening: bool,
    /// Plies played so far in the contest.
    pub plies_played: usize,
}

/// External search component. Implementations must poll `stopper` and,
/// once it is set, return promptly with the best move found so far.
pub trait Searcher: Send + Sync {
    fn search(&self, request: &SearchRequest, stopper: &AtomicBool) -> Option<ChessMove>;
}

/// Plies during which random opening moves may be played.
const RANDOM_OPENING_PLIES: usize = 4;
const MATE_SCORE: i32 = 100_000;

/// Iterative-deepening material negamax. Always seeds its answer with a
/// legal move so a forced stop still yields a candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialSearch;

impl Searcher for MaterialSearch {
    fn search(&self, request: &SearchRequest, stopper: &AtomicBool) -> Option<ChessMove> {
        let moves: Vec<ChessMove> = MoveGen::new_legal(&request.board).collect();
        let mut best = *moves.first()?;

        if request.random_opening && request.plies_played < RANDOM_OPENING_PLIES {
            return moves.choose(&mut rand::thread_rng()).copied();
        }

        let deadline = request.time_budget.map(|budget| Instant::now() + budget);
        let out_of_time =
            || stopper.load(Ordering::Relaxed) || deadline.map_or(false, |d| Instant::now() >= d);

        for depth in 1..=request.max_depth.max(1) {
            let mut alpha = -MATE_SCORE - 1;
            let mut depth_best = None;
            for &candidate in &moves {
                if out_of_time() {
                    return Some(best);
                }
                let child = request.board.make_move_new(candidate);
                let score = -negamax(&child, depth - 1, -MATE_SCORE - 1, -alpha, &out_of_time);
                if score > alpha {
                    alpha = score;
                    depth_best = Some(candidate);
                }
            }
            if let Some(found) = depth_best {
                best = found;
            }
        }
        Some(best)
    }
}

fn negamax(
    board: &Board,
    depth: u32,
    mut alpha: i32,
    beta: i32,
    out_of_time: &dyn Fn() -> bool,
) -> i32 {
    match board.status() {
        BoardStatus::Checkmate => return -MATE_SCORE,
        BoardStatus::Stalemate => return 0,
        BoardStatus::Ongoing => {}
    }
    if depth == 0 || out_of_time() {
        return material(board);
    }
    for candidate in MoveGen::new_legal(board) {
        let child = board.make_move_new(candidate);
        let score = -negamax(&child, depth - 1, -beta, -alpha, out_of_time);
        if score >= beta {
            return beta;
        }
        alpha = alpha.max(score);
    }
    alpha
}

/// Material balance from the side to move's point of view.
fn material(board: &Board) -> i32 {
    const VALUES: [(Piece, i32); 5] = [
        (Piece::Pawn, 100),
        (Piece::Knight, 300),
        (Piece::Bishop, 320),
        (Piece::Rook, 500),
        (Piece::Queen, 900),
    ];
    let us = board.side_to_move();
    let them = match us {
        Color::White => Color::Black,
        Color::Black => Color::White,
    };
    VALUES
        .iter()
        .map(|&(piece, value)| {
            let ours = (*board.pieces(piece) & *board.color_combined(us)).popcnt() as i32;
            let theirs = (*board.pieces(piece) & *board.color_combined(them)).popcnt() as i32;
            (ours - theirs) * value
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn request(fen: &str, depth: u32) -> SearchRequest {
        SearchRequest {
            board: Board::from_str(fen).unwrap(),
            max_depth: depth,
            time_budget: None,
            random_opening: false,
            plies_played: 10,
        }
    }

    #[test]
    fn takes_a_hanging_queen() {
        // White rook on d1 can take the undefended queen on d8
        let req = request("3q3k/6pp/8/8/8/8/6PP/3R3K w - - 0 1", 1);
        let best = MaterialSearch.search(&req, &AtomicBool::new(false)).unwrap();
        assert_eq!(best.to_string(), "d1d8");
    }

    #[test]
    fn finds_mate_in_one() {
        let req = request("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 2);
        let best = MaterialSearch.search(&req, &AtomicBool::new(false)).unwrap();
        assert_eq!(best.to_string(), "a1a8");
    }

    #[test]
    fn stopped_search_still_answers() {
        let req = request(crate::game::board::START_FEN, 6);
        let stopper = AtomicBool::new(true);
        assert!(MaterialSearch.search(&req, &stopper).is_some());
    }

    #[test]
    fn no_moves_no_answer() {
        let req = request("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 2);
        assert!(MaterialSearch.search(&req, &AtomicBool::new(false)).is_none());
    }
}
