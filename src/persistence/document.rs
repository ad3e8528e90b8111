//! On-disk schema of a saved contest.
//!
//! A saved game is configuration plus the complete move list in play order;
//! the position itself is never stored and is rebuilt by replaying the moves.
//! Every configuration attribute is optional so that older files lacking newer
//! attributes still load; absent attributes leave the live value untouched.

use serde::{Deserialize, Serialize};

use crate::game::board::ChessBoard;
use crate::game::moves::MoveRecord;
use crate::game::player::Intelligence;
use crate::game::settings::Orientation;

/// Version tag written into every document.
pub const DOCUMENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct GameDocument {
    /// Starting position; omitted for the standard start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fen: Option<String>,
    /// Ply cursor; moves past it are loaded onto the redo list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_no: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_player: Option<Intelligence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_player: Option<Intelligence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_orientation: Option<Orientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_moves: Option<u32>,
    /// Read from old files only; superseded by `clock_seconds`.
    #[serde(default, skip_serializing)]
    pub clock_minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_search_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pondering: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_random_opening_moves: Option<bool>,
    #[serde(default)]
    pub moves: Vec<MoveEntry>,
}

impl GameDocument {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// One saved ply. Squares are always written by name; old files that give
/// zero-based file/rank pairs are converted while reading.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "RawMoveEntry")]
pub struct MoveEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_no: Option<u32>,
    pub name: String,
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_elapsed: Option<u64>,
}

impl From<&MoveRecord> for MoveEntry {
    fn from(record: &MoveRecord) -> Self {
        Self {
            move_no: record.move_no(),
            name: record.name().to_string(),
            from: record.from().to_string(),
            to: record.to().to_string(),
            seconds_elapsed: Some(record.time_stamp().as_secs_f64().round() as u64),
        }
    }
}

#[derive(Deserialize)]
struct RawMoveEntry {
    #[serde(default)]
    move_no: Option<u32>,
    name: String,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    from_file: Option<i64>,
    #[serde(default)]
    from_rank: Option<i64>,
    #[serde(default)]
    to_file: Option<i64>,
    #[serde(default)]
    to_rank: Option<i64>,
    #[serde(default)]
    seconds_elapsed: Option<u64>,
}

impl TryFrom<RawMoveEntry> for MoveEntry {
    type Error = String;

    fn try_from(raw: RawMoveEntry) -> Result<Self, Self::Error> {
        let (from, to) = match (raw.from_file, raw.from_rank, raw.to_file, raw.to_rank) {
            (Some(from_file), Some(from_rank), Some(to_file), Some(to_rank)) => {
                let from = ChessBoard::square_at(from_file, from_rank).map_err(|e| e.to_string())?;
                let to = ChessBoard::square_at(to_file, to_rank).map_err(|e| e.to_string())?;
                (from.to_string(), to.to_string())
            }
            (None, None, None, None) => match (raw.from, raw.to) {
                (Some(from), Some(to)) => (from, to),
                _ => return Err(format!("move {} is missing its squares", raw.name)),
            },
            _ => return Err(format!("move {} has an incomplete file/rank pair", raw.name)),
        };

        Ok(Self {
            move_no: raw.move_no,
            name: raw.name,
            from,
            to,
            seconds_elapsed: raw.seconds_elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_attributes_stay_absent() {
        let document = GameDocument::from_json(r#"{ "moves": [] }"#).unwrap();
        assert_eq!(document, GameDocument::default());
        assert_eq!(document.to_json().unwrap().trim(), "{\n  \"moves\": []\n}");
    }

    #[test]
    fn zero_is_not_absence() {
        let document = GameDocument::from_json(r#"{ "difficulty_level": 0 }"#).unwrap();
        assert_eq!(document.difficulty_level, Some(0));
        assert_eq!(document.maximum_search_depth, None);
    }

    #[test]
    fn legacy_file_rank_squares_are_read() {
        let document = GameDocument::from_json(
            r#"{ "moves": [
                { "name": "Standard", "from_file": 4, "from_rank": 1, "to_file": 4, "to_rank": 3 },
                { "name": "Standard", "from": "e7", "to": "e5", "seconds_elapsed": 4 }
            ] }"#,
        )
        .unwrap();
        assert_eq!(document.moves[0].from, "e2");
        assert_eq!(document.moves[0].to, "e4");
        assert_eq!(document.moves[0].seconds_elapsed, None);
        assert_eq!(document.moves[1].seconds_elapsed, Some(4));
    }

    #[test]
    fn legacy_minutes_are_never_written() {
        let document = GameDocument {
            clock_minutes: Some(5),
            ..GameDocument::default()
        };
        assert!(!document.to_json().unwrap().contains("clock_minutes"));
    }

    #[test]
    fn malformed_entries_fail_the_document() {
        assert!(
            GameDocument::from_json(r#"{ "moves": [ { "name": "Standard", "from": "e2" } ] }"#)
                .is_err()
        );
        assert!(GameDocument::from_json(
            r#"{ "moves": [ { "name": "Standard", "from_file": 4, "to_file": 4, "to_rank": 3 } ] }"#
        )
        .is_err());
        assert!(GameDocument::from_json("<Game/>").is_err());
    }
}
