use chess::{Piece, Square};
use log::info;

use chess_contest::{ChessBoard, GameError, Intelligence, Side};

use crate::models::{ClientMessage, Reply, ServerMessage};
use crate::websocket::handler::ChessWebSocket;

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("Missing {}", field))
}

fn square(name: &str) -> Result<Square, String> {
    ChessBoard::square_named(name).map_err(|e| e.to_string())
}

fn parse_promotion(name: &str) -> Result<Piece, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "q" | "queen" => Ok(Piece::Queen),
        "r" | "rook" => Ok(Piece::Rook),
        "b" | "bishop" => Ok(Piece::Bishop),
        "n" | "knight" => Ok(Piece::Knight),
        other => Err(format!("Cannot promote to {}", other)),
    }
}

fn parse_side(name: &str) -> Result<Side, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "white" => Ok(Side::White),
        "black" => Ok(Side::Black),
        other => Err(format!("Unknown side {}", other)),
    }
}

fn parse_intelligence(name: &str) -> Result<Intelligence, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "human" => Ok(Intelligence::Human),
        "computer" => Ok(Intelligence::Computer),
        other => Err(format!("Unknown intelligence {}", other)),
    }
}

fn describe(e: GameError) -> String {
    e.to_string()
}

impl ChessWebSocket {
    /// Runs `operation` on the contest under its lock and answers with the
    /// resulting state.
    fn with_game<F>(&self, message_type: &str, operation: F) -> Reply
    where
        F: FnOnce(&mut chess_contest::Game) -> chess_contest::Result<()>,
    {
        let mut game = self.app_state.game();
        operation(&mut *game).map_err(describe)?;
        Ok(ServerMessage::snapshot(message_type, &game))
    }

    pub fn handle_new_game(&self, msg: &ClientMessage) -> Reply {
        info!("Session {} starts a new game", self.id);
        self.with_game("new_game", |game| game.new_game(msg.fen.as_deref()))
    }

    pub fn handle_move(&self, msg: &ClientMessage) -> Reply {
        let from = square(required(&msg.move_from, "move_from")?)?;
        let to = square(required(&msg.move_to, "move_to")?)?;
        let promotion = match msg.promote_to.as_deref() {
            Some(name) if !name.trim().is_empty() => Some(parse_promotion(name)?),
            _ => None,
        };
        info!("Session {} moves {}{}", self.id, from, to);
        self.with_game("move_made", |game| game.play(from, to, promotion))
    }

    pub fn handle_undo(&self) -> Reply {
        self.with_game("undo", |game| game.undo_move())
    }

    pub fn handle_redo(&self) -> Reply {
        self.with_game("redo", |game| game.redo_move())
    }

    pub fn handle_undo_all(&self) -> Reply {
        self.with_game("undo_all", |game| game.undo_all_moves())
    }

    pub fn handle_redo_all(&self) -> Reply {
        self.with_game("redo_all", |game| game.redo_all_moves())
    }

    pub fn handle_pause(&self) -> Reply {
        self.with_game("paused", |game| game.pause_play())
    }

    pub fn handle_resume(&self) -> Reply {
        self.with_game("resumed", |game| game.resume_play())
    }

    pub fn handle_think(&self) -> Reply {
        self.with_game("thinking", |game| game.think())
    }

    pub fn handle_save(&self, msg: &ClientMessage) -> Reply {
        let path = required(&msg.path, "path")?;
        self.with_game("saved", |game| game.save(path))
    }

    pub fn handle_load(&self, msg: &ClientMessage) -> Reply {
        let path = required(&msg.path, "path")?;
        self.with_game("loaded", |game| game.load(path))
    }

    pub fn handle_set_player(&self, msg: &ClientMessage) -> Reply {
        let side = parse_side(required(&msg.side, "side")?)?;
        let intelligence = parse_intelligence(required(&msg.intelligence, "intelligence")?)?;
        self.with_game("player_set", |game| {
            game.set_player_intelligence(side, intelligence)
        })
    }

    pub fn handle_get_moves(&self, msg: &ClientMessage) -> Reply {
        let from = square(required(&msg.square, "square")?)?;
        let game = self.app_state.game();
        let moves = game
            .legal_destinations(from)
            .into_iter()
            .map(|dest| dest.to_string())
            .collect();
        Ok(ServerMessage {
            message_type: "available_moves".to_string(),
            available_moves: Some(moves),
            ..ServerMessage::default()
        })
    }
}
