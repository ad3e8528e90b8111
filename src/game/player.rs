use std::fmt;

use chess::Color;
use serde::{Deserialize, Serialize};

use crate::brain::Brain;
use crate::game::clock::Clock;

/// One of the two players. White always moves first from the standard
/// start position; a FEN may hand the first move to black.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposing(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::White => write!(f, "white"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// Who decides a side's moves.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intelligence {
    #[default]
    Human,
    Computer,
}

/// Status of a side immediately after its opponent moved.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    #[default]
    Normal,
    InCheck,
    InCheckMate,
    InStaleMate,
}

/// Per-side mutable state: who plays it, its clock and its brain.
pub struct Player {
    side: Side,
    pub intelligence: Intelligence,
    pub clock: Clock,
    pub brain: Brain,
}

impl Player {
    pub(crate) fn new(side: Side, intelligence: Intelligence, brain: Brain) -> Self {
        Self {
            side,
            intelligence,
            clock: Clock::new(),
            brain,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn opposing_side(&self) -> Side {
        self.side.opposing()
    }

    pub fn is_computer(&self) -> bool {
        self.intelligence == Intelligence::Computer
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Player")
            .field("side", &self.side)
            .field("intelligence", &self.intelligence)
            .field("clock", &self.clock)
            .finish()
    }
}
