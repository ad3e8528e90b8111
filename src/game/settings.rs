use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which side is drawn at the bottom of the board.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    White,
    Black,
}

/// Contest configuration values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GameSettings {
    pub difficulty_level: u32,
    /// Moves to be played within `clock_time`, e.g. 40 moves in 5 minutes.
    pub clock_max_moves: u32,
    pub clock_time: Duration,
    pub clock_increment_per_move: Duration,
    pub clock_fixed_time_per_move: Duration,
    pub maximum_search_depth: u32,
    pub enable_pondering: bool,
    pub use_random_opening_moves: bool,
    pub board_orientation: Orientation,
    pub capture_move_analysis_data: bool,
    pub edit_mode_active: bool,
    pub analyse_mode: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty_level: 1,
            clock_max_moves: 40,
            clock_time: Duration::from_secs(5 * 60),
            clock_increment_per_move: Duration::ZERO,
            clock_fixed_time_per_move: Duration::ZERO,
            maximum_search_depth: 1,
            enable_pondering: false,
            use_random_opening_moves: true,
            board_orientation: Orientation::White,
            capture_move_analysis_data: false,
            edit_mode_active: false,
            analyse_mode: false,
        }
    }
}

impl GameSettings {
    /// Time a computer side may spend on its next move.
    pub fn time_per_move(&self) -> Duration {
        if !self.clock_fixed_time_per_move.is_zero() {
            return self.clock_fixed_time_per_move;
        }
        self.clock_time / self.clock_max_moves.max(1) + self.clock_increment_per_move
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_wins_over_clock_share() {
        let mut settings = GameSettings::default();
        assert_eq!(settings.time_per_move(), Duration::from_millis(7500));

        settings.clock_increment_per_move = Duration::from_secs(2);
        assert_eq!(settings.time_per_move(), Duration::from_millis(9500));

        settings.clock_fixed_time_per_move = Duration::from_secs(3);
        assert_eq!(settings.time_per_move(), Duration::from_secs(3));
    }

    #[test]
    fn zero_clock_moves_does_not_divide_by_zero() {
        let settings = GameSettings {
            clock_max_moves: 0,
            ..GameSettings::default()
        };
        assert_eq!(settings.time_per_move(), Duration::from_secs(300));
    }
}
