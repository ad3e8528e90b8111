use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::{error, info, warn};
use std::io;
use std::thread;

use chess_contest::config::{Args, Settings};
use chess_contest::persistence::JsonPreferenceStore;
use chess_contest::Game;

mod models;
mod routes;
mod websocket;

use models::{AppState, ServerMessage};

fn to_io(e: chess_contest::GameError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

/// Feeds brain completion notices back into the contest. A broken engine
/// invariant shuts the server down.
fn spawn_brain_pump(state: web::Data<AppState>, server: ServerHandle) -> io::Result<()> {
    let events = state.game().brain_events();
    thread::Builder::new()
        .name("brain pump".to_string())
        .spawn(move || {
            for event in events {
                let outcome = state.game().handle_brain_event(event);
                match outcome {
                    Ok(_) => {}
                    Err(e) if e.is_fatal() => {
                        error!("stopping server: {}", e);
                        let _ = server.stop(true);
                        break;
                    }
                    Err(e) => warn!("computer move failed: {}", e),
                }
            }
        })?;
    Ok(())
}

/// Broadcasts the contest state to every session whenever it changes.
fn spawn_event_pump(state: web::Data<AppState>) -> io::Result<()> {
    let events = state.game().subscribe();
    thread::Builder::new()
        .name("event pump".to_string())
        .spawn(move || {
            for event in events {
                let name = serde_json::to_value(event)
                    .ok()
                    .and_then(|value| value.as_str().map(str::to_string))
                    .unwrap_or_else(|| "state".to_string());
                let message = ServerMessage::snapshot(&name, &state.game());
                state.broadcast(&message);
            }
        })?;
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    let settings = Settings::load(&args).map_err(to_io)?;
    let preferences = JsonPreferenceStore::open(&settings.preferences_path).map_err(to_io)?;

    let mut builder = Game::builder()
        .settings(settings.game.clone())
        .players(settings.white, settings.black)
        .preferences(preferences);
    if let Some(backup) = &settings.backup_path {
        builder = builder.backup_path(backup.clone());
    }
    let game = builder.build().map_err(to_io)?;

    let app_state = web::Data::new(AppState::new(game));

    let (host, port) = settings.bind_address();
    info!("Starting chess contest server at http://{}:{}", host, port);

    let server_state = app_state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .configure(routes::configure_routes)
    })
    .bind((host.as_str(), port))?
    .run();

    spawn_brain_pump(app_state.clone(), server.handle())?;
    spawn_event_pump(app_state.clone())?;
    server.await?;

    app_state.game().terminate().map_err(to_io)?;
    Ok(())
}
