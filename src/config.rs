//! Server configuration: an optional JSON file, then command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::game::player::Intelligence;
use crate::game::settings::GameSettings;

#[derive(Parser, Debug, Default)]
#[command(name = "chess_contest", about = "Play a chess contest over a WebSocket")]
pub struct Args {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to bind to
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Automatic backup written after every change
    #[arg(long)]
    pub backup: Option<PathBuf>,

    /// Preference file
    #[arg(long)]
    pub preferences: Option<PathBuf>,

    /// Search depth of computer sides
    #[arg(long)]
    pub depth: Option<u32>,

    /// Let the brain search on the opponent's time
    #[arg(long)]
    pub ponder: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub backup_path: Option<PathBuf>,
    pub preferences_path: PathBuf,
    pub white: Intelligence,
    pub black: Intelligence,
    pub game: GameSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            backup_path: Some(PathBuf::from("backup.json")),
            preferences_path: PathBuf::from("preferences.json"),
            white: Intelligence::Human,
            black: Intelligence::Computer,
            game: GameSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let settings = serde_json::from_str(&text)?;
        info!("configuration read from {}", path.as_ref().display());
        Ok(settings)
    }

    /// File settings (or defaults) with the command line applied on top.
    pub fn load(args: &Args) -> Result<Self> {
        let mut settings = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(host) = &args.host {
            settings.host = host.clone();
        }
        if let Some(port) = args.port {
            settings.port = port;
        }
        if let Some(backup) = &args.backup {
            settings.backup_path = Some(backup.clone());
        }
        if let Some(preferences) = &args.preferences {
            settings.preferences_path = preferences.clone();
        }
        if let Some(depth) = args.depth {
            settings.game.maximum_search_depth = depth;
        }
        if args.ponder {
            settings.game.enable_pondering = true;
        }
        Ok(settings)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
