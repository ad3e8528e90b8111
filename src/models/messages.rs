use actix::Message;
use serde::{Deserialize, Serialize};

use chess_contest::game::utils::{get_game_status, side_to_string};
use chess_contest::{Game, Side};

/// Message sent from client to server
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ClientMessage {
    pub message_type: String,
    pub fen: Option<String>,
    pub move_from: Option<String>,
    pub move_to: Option<String>,
    pub promote_to: Option<String>,
    pub path: Option<String>,
    pub side: Option<String>,
    pub intelligence: Option<String>,
    pub square: Option<String>,
}

/// Message sent from server to client
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ServerMessage {
    pub message_type: String,
    pub fen: Option<String>,
    pub to_play: Option<String>,
    pub turn_no: Option<u32>,
    pub paused: Option<bool>,
    pub history_len: Option<usize>,
    pub redo_len: Option<usize>,
    pub white_seconds: Option<u64>,
    pub black_seconds: Option<u64>,
    pub game_status: Option<String>,
    pub last_move: Option<LastMove>,
    pub available_moves: Option<Vec<String>>,
    pub file_name: Option<String>,
    pub error: Option<String>,
}

/// Last move information
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LastMove {
    pub from: String,
    pub to: String,
    pub name: String,
}

impl ServerMessage {
    /// Full view of the contest as clients render it.
    pub fn snapshot(message_type: &str, game: &Game) -> Self {
        let seconds = |side: Side| game.player(side).clock.time_elapsed().as_secs();
        Self {
            message_type: message_type.to_string(),
            fen: Some(game.fen()),
            to_play: Some(side_to_string(game.to_play())),
            turn_no: Some(game.turn_no()),
            paused: Some(game.is_paused()),
            history_len: Some(game.history().len()),
            redo_len: Some(game.redo_list().len()),
            white_seconds: Some(seconds(Side::White)),
            black_seconds: Some(seconds(Side::Black)),
            game_status: Some(get_game_status(game.board().position())),
            last_move: game.history().last().map(|record| LastMove {
                from: record.from().to_string(),
                to: record.to().to_string(),
                name: record.name().to_string(),
            }),
            available_moves: None,
            file_name: Some(game.file_name().to_string()),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            message_type: "error".to_string(),
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Replies are either a message for the client or an error text.
pub type Reply = Result<ServerMessage, String>;

/// Message type for WebSocket communication
#[derive(Message)]
#[rtype(result = "()")]
pub struct ChessWebSocketMessage(pub String);
