use actix::Addr;
use log::warn;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chess_contest::Game;

use crate::models::{ChessWebSocketMessage, ServerMessage};
use crate::websocket::ChessWebSocket;

/// Application state shared between connections: the one contest and
/// every open session.
pub struct AppState {
    pub game: Mutex<Game>,
    pub sessions: Mutex<HashMap<String, Addr<ChessWebSocket>>>,
}

impl AppState {
    pub fn new(game: Game) -> Self {
        Self {
            game: Mutex::new(game),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Locks the contest. A handler that panicked mid-operation does not
    /// take the server down with it.
    pub fn game(&self) -> MutexGuard<'_, Game> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sessions(&self) -> MutexGuard<'_, HashMap<String, Addr<ChessWebSocket>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn broadcast(&self, message: &ServerMessage) {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                warn!("Error serializing message: {}", e);
                return;
            }
        };
        for addr in self.sessions().values() {
            addr.do_send(ChessWebSocketMessage(text.clone()));
        }
    }
}
