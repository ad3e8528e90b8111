pub mod brain;
pub mod config;
pub mod error;
pub mod game;
pub mod persistence;

pub use error::{GameError, Result};
pub use game::board::{ChessBoard, START_FEN};
pub use game::events::GameEvent;
pub use game::moves::{MoveLog, MoveName, MoveRecord};
pub use game::player::{Intelligence, PlayerStatus, Side};
pub use game::settings::GameSettings;
pub use game::{Game, GameBuilder};
