//! Converting a contest to and from its saved document.
//!
//! Loading never trusts a stored position: the moves are played again from
//! the starting position, so every loaded ply has passed the board's
//! legality check.

use std::time::Duration;

use crate::error::Result;
use crate::game::board::ChessBoard;
use crate::game::moves::MoveName;
use crate::game::player::Side;
use crate::game::Game;
use crate::persistence::document::{GameDocument, MoveEntry, DOCUMENT_VERSION};

/// Thinking time credited to each ply of an old file that recorded none.
pub const MISSING_TIME_STEP: Duration = Duration::from_secs(30);

impl Game {
    /// Snapshot of the contest as a saved document: the configuration, the
    /// history in play order followed by the redo list in the order it
    /// would be replayed, and the cursor separating the two.
    pub fn to_document(&self) -> GameDocument {
        let moves = self
            .history
            .iter()
            .chain(self.redo.iter().rev())
            .map(MoveEntry::from)
            .collect();

        GameDocument {
            fen: (!self.board.is_standard_start()).then(|| self.board.start_fen().to_string()),
            turn_no: Some(self.turn_no),
            white_player: Some(self.player(Side::White).intelligence),
            black_player: Some(self.player(Side::Black).intelligence),
            board_orientation: Some(self.settings.board_orientation),
            version: Some(DOCUMENT_VERSION.to_string()),
            difficulty_level: Some(self.settings.difficulty_level),
            clock_moves: Some(self.settings.clock_max_moves),
            clock_minutes: None,
            clock_seconds: Some(self.settings.clock_time.as_secs()),
            maximum_search_depth: Some(self.settings.maximum_search_depth),
            pondering: Some(self.settings.enable_pondering),
            use_random_opening_moves: Some(self.settings.use_random_opening_moves),
            moves,
        }
    }

    /// Rebuilds the contest from `document` on top of a freshly reset
    /// contest. Stops at the first move that does not replay.
    pub(crate) fn restore(&mut self, document: &GameDocument) -> Result<()> {
        if let Some(fen) = document.fen.as_deref().filter(|f| !f.trim().is_empty()) {
            self.new_internal(fen)?;
        }
        self.apply_document_settings(document);

        for entry in &document.moves {
            let name: MoveName = entry.name.parse()?;
            let from = ChessBoard::square_named(&entry.from)?;
            let to = ChessBoard::square_named(&entry.to)?;
            let chess_move = self.board.resolve(name, from, to)?;
            self.make_move_internal(chess_move, false)?;

            let stamp = match entry.seconds_elapsed {
                Some(seconds) => Duration::from_secs(seconds),
                None if self.history.len() <= 2 => Duration::ZERO,
                None => {
                    self.history
                        .penultimate_for_same_side()
                        .map_or(Duration::ZERO, |r| r.time_stamp())
                        + MISSING_TIME_STEP
                }
            };
            if let Some(last) = self.history.last_mut() {
                last.set_time_stamp(stamp);
                let mover = last.side();
                self.players[mover.index()].clock.set_time_elapsed(stamp);
            }
        }

        let cursor = document.turn_no.unwrap_or(self.turn_no);
        while self.turn_no > cursor {
            if !self.undo_move_internal()? {
                break;
            }
        }
        Ok(())
    }

    fn apply_document_settings(&mut self, document: &GameDocument) {
        if let Some(intelligence) = document.white_player {
            self.players[Side::White.index()].intelligence = intelligence;
        }
        if let Some(intelligence) = document.black_player {
            self.players[Side::Black.index()].intelligence = intelligence;
        }
        if let Some(orientation) = document.board_orientation {
            self.settings.board_orientation = orientation;
        }
        if let Some(level) = document.difficulty_level {
            self.settings.difficulty_level = level;
        }
        if let Some(moves) = document.clock_moves {
            self.settings.clock_max_moves = moves;
        }
        if let Some(minutes) = document.clock_minutes {
            self.settings.clock_time = Duration::from_secs(minutes * 60);
        }
        if let Some(seconds) = document.clock_seconds {
            self.settings.clock_time = Duration::from_secs(seconds);
        }
        if let Some(depth) = document.maximum_search_depth {
            self.settings.maximum_search_depth = depth;
        }
        if let Some(pondering) = document.pondering {
            self.settings.enable_pondering = pondering;
        }
        if let Some(random) = document.use_random_opening_moves {
            self.settings.use_random_opening_moves = random;
        }
    }
}
