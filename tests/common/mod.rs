#![allow(dead_code)]

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chess::{ChessMove, MoveGen, Square};
use chess_contest::brain::search::{SearchRequest, Searcher};
use chess_contest::game::protocol::{DrawReason, ProtocolAdapter};
use chess_contest::{ChessBoard, Game, Intelligence, MoveRecord};
use uuid::Uuid;

/// Answers at once with the first legal move.
pub struct FirstMove;

impl Searcher for FirstMove {
    fn search(&self, request: &SearchRequest, _stopper: &AtomicBool) -> Option<ChessMove> {
        MoveGen::new_legal(&request.board).next()
    }
}

/// Never finishes on its own; answers with the first legal move once stopped.
pub struct UntilStopped;

impl Searcher for UntilStopped {
    fn search(&self, request: &SearchRequest, stopper: &AtomicBool) -> Option<ChessMove> {
        while !stopper.load(Ordering::Relaxed) {
            thread::sleep(Duration::from_millis(1));
        }
        MoveGen::new_legal(&request.board).next()
    }
}

/// Records what the contest tells an external protocol.
#[derive(Clone, Default)]
pub struct Recording {
    pub active: bool,
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl ProtocolAdapter for Recording {
    fn is_active(&self) -> bool {
        self.active
    }

    fn send_move(&mut self, record: &MoveRecord) {
        self.sent.lock().unwrap().push(format!("move {record}"));
    }

    fn send_checkmate(&mut self) {
        self.sent.lock().unwrap().push("checkmate".to_string());
    }

    fn send_stalemate(&mut self) {
        self.sent.lock().unwrap().push("stalemate".to_string());
    }

    fn send_draw(&mut self, reason: DrawReason) {
        self.sent.lock().unwrap().push(format!("draw {reason:?}"));
    }

    fn stop_listener(&mut self) {
        self.sent.lock().unwrap().push("stopped".to_string());
    }
}

pub const WAIT: Duration = Duration::from_secs(5);

pub fn temp_path(prefix: &str) -> PathBuf {
    env::temp_dir().join(format!("{prefix}-{}.json", Uuid::new_v4()))
}

pub fn sq(name: &str) -> Square {
    ChessBoard::square_named(name).unwrap()
}

pub fn humans() -> Game {
    Game::builder()
        .players(Intelligence::Human, Intelligence::Human)
        .searcher(FirstMove)
        .build()
        .unwrap()
}

/// Plays human moves given as (from, to) pairs.
pub fn play(game: &mut Game, moves: &[(&str, &str)]) {
    for (from, to) in moves {
        game.play(sq(from), sq(to), None).unwrap();
    }
}

pub const TEN_PLIES: [(&str, &str); 10] = [
    ("e2", "e4"),
    ("e7", "e5"),
    ("g1", "f3"),
    ("b8", "c6"),
    ("f1", "b5"),
    ("a7", "a6"),
    ("b5", "a4"),
    ("g8", "f6"),
    ("e1", "g1"),
    ("f8", "e7"),
];
