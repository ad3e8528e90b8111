use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{info, warn};
use uuid::Uuid;

use crate::models::*;

/// WebSocket session attached to the shared contest
pub struct ChessWebSocket {
    pub id: String,
    pub app_state: web::Data<AppState>,
}

impl Actor for ChessWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let addr = ctx.address();
        let total_sessions = {
            let mut sessions = self.app_state.sessions();
            sessions.insert(self.id.clone(), addr);
            sessions.len()
        };
        info!("WebSocket connection started: {}", self.id);
        info!("Total active sessions: {}", total_sessions);

        let state = ServerMessage::snapshot("state", &self.app_state.game());
        self.send(&state, ctx);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        let total_sessions = {
            let mut sessions = self.app_state.sessions();
            sessions.remove(&self.id);
            sessions.len()
        };
        info!("WebSocket connection closed: {}", self.id);
        info!("Total active sessions: {}", total_sessions);
        Running::Stop
    }
}

impl Handler<ChessWebSocketMessage> for ChessWebSocket {
    type Result = ();

    fn handle(&mut self, msg: ChessWebSocketMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChessWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                info!("Received text message: {}", text);
                match serde_json::from_str::<ClientMessage>(text.as_ref()) {
                    Ok(client_msg) => self.handle_message(client_msg, ctx),
                    Err(e) => {
                        warn!("Error parsing client message: {}", e);
                        let reply = ServerMessage::error(format!("Invalid message format: {}", e));
                        self.send(&reply, ctx);
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                self.send(&ServerMessage::error("Binary messages are not supported"), ctx);
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => {
                ctx.stop();
            }
        }
    }
}

impl ChessWebSocket {
    pub fn send(&self, message: &ServerMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::to_string(message) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Error serializing message: {}", e),
        }
    }

    pub fn handle_message(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let reply = match msg.message_type.as_str() {
            "state" => Ok(ServerMessage::snapshot("state", &self.app_state.game())),
            "new_game" => self.handle_new_game(&msg),
            "move" => self.handle_move(&msg),
            "undo" => self.handle_undo(),
            "redo" => self.handle_redo(),
            "undo_all" => self.handle_undo_all(),
            "redo_all" => self.handle_redo_all(),
            "pause" => self.handle_pause(),
            "resume" => self.handle_resume(),
            "think" => self.handle_think(),
            "save" => self.handle_save(&msg),
            "load" => self.handle_load(&msg),
            "set_player" => self.handle_set_player(&msg),
            "get_moves" => self.handle_get_moves(&msg),
            other => Err(format!("Unknown message type: {}", other)),
        };

        match reply {
            Ok(message) => self.send(&message, ctx),
            Err(error) => {
                warn!("{} failed: {}", msg.message_type, error);
                self.send(&ServerMessage::error(error), ctx);
            }
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let id = Uuid::new_v4().to_string();
    info!("New WebSocket connection: {}", id);

    let ws = ChessWebSocket {
        id,
        app_state: app_state.clone(),
    };

    ws::start(ws, &req, stream)
}
