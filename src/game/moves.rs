//! Move records and the logs that hold them.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chess::{Piece, Square};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::player::{PlayerStatus, Side};

/// Kind of a ply, as written to save files.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveName {
    Standard,
    CastleKingSide,
    CastleQueenSide,
    EnPassant,
    PawnPromotionQueen,
    PawnPromotionRook,
    PawnPromotionBishop,
    PawnPromotionKnight,
}

impl MoveName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveName::Standard => "Standard",
            MoveName::CastleKingSide => "CastleKingSide",
            MoveName::CastleQueenSide => "CastleQueenSide",
            MoveName::EnPassant => "EnPassant",
            MoveName::PawnPromotionQueen => "PawnPromotionQueen",
            MoveName::PawnPromotionRook => "PawnPromotionRook",
            MoveName::PawnPromotionBishop => "PawnPromotionBishop",
            MoveName::PawnPromotionKnight => "PawnPromotionKnight",
        }
    }

    /// Promotion piece implied by this move kind.
    pub fn promotion(&self) -> Option<Piece> {
        match self {
            MoveName::PawnPromotionQueen => Some(Piece::Queen),
            MoveName::PawnPromotionRook => Some(Piece::Rook),
            MoveName::PawnPromotionBishop => Some(Piece::Bishop),
            MoveName::PawnPromotionKnight => Some(Piece::Knight),
            _ => None,
        }
    }

    pub fn from_promotion(piece: Piece) -> Option<MoveName> {
        match piece {
            Piece::Queen => Some(MoveName::PawnPromotionQueen),
            Piece::Rook => Some(MoveName::PawnPromotionRook),
            Piece::Bishop => Some(MoveName::PawnPromotionBishop),
            Piece::Knight => Some(MoveName::PawnPromotionKnight),
            _ => None,
        }
    }
}

impl fmt::Display for MoveName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveName {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" => Ok(MoveName::Standard),
            "CastleKingSide" => Ok(MoveName::CastleKingSide),
            "CastleQueenSide" => Ok(MoveName::CastleQueenSide),
            // Older files spell it the French way round.
            "EnPassant" | "EnPassent" => Ok(MoveName::EnPassant),
            "PawnPromotionQueen" => Ok(MoveName::PawnPromotionQueen),
            "PawnPromotionRook" => Ok(MoveName::PawnPromotionRook),
            "PawnPromotionBishop" => Ok(MoveName::PawnPromotionBishop),
            "PawnPromotionKnight" => Ok(MoveName::PawnPromotionKnight),
            other => Err(GameError::IllegalMove(format!("unknown move name {other}"))),
        }
    }
}

/// One applied ply.
///
/// Records are created by the board when a move is applied and are moved,
/// never copied, between the history and the redo list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    side: Side,
    piece: Piece,
    from: Square,
    to: Square,
    name: MoveName,
    captured: Option<Piece>,
    time_stamp: Duration,
    enemy_status: PlayerStatus,
    move_no: Option<u32>,
}

impl MoveRecord {
    pub(crate) fn new(
        side: Side,
        piece: Piece,
        from: Square,
        to: Square,
        name: MoveName,
        captured: Option<Piece>,
        enemy_status: PlayerStatus,
    ) -> Self {
        Self {
            side,
            piece,
            from,
            to,
            name,
            captured,
            time_stamp: Duration::ZERO,
            enemy_status,
            move_no: None,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn piece(&self) -> Piece {
        self.piece
    }

    pub fn from(&self) -> Square {
        self.from
    }

    pub fn to(&self) -> Square {
        self.to
    }

    pub fn name(&self) -> MoveName {
        self.name
    }

    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }

    /// Cumulative clock time of the mover once this move was made.
    pub fn time_stamp(&self) -> Duration {
        self.time_stamp
    }

    pub fn enemy_status(&self) -> PlayerStatus {
        self.enemy_status
    }

    /// Ply index at which the move was applied.
    pub fn move_no(&self) -> Option<u32> {
        self.move_no
    }

    pub(crate) fn set_time_stamp(&mut self, time_stamp: Duration) {
        self.time_stamp = time_stamp;
    }

    pub(crate) fn set_enemy_status(&mut self, status: PlayerStatus) {
        self.enemy_status = status;
    }

    pub(crate) fn set_move_no(&mut self, move_no: u32) {
        self.move_no = Some(move_no);
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.name.promotion() {
            let letter = match piece {
                Piece::Queen => 'q',
                Piece::Rook => 'r',
                Piece::Bishop => 'b',
                _ => 'n',
            };
            write!(f, "{letter}")?;
        }
        Ok(())
    }
}

/// Ordered sequence of move records, insertion order = play order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveLog {
    moves: Vec<MoveRecord>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn push(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    pub fn pop(&mut self) -> Option<MoveRecord> {
        self.moves.pop()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn last(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut MoveRecord> {
        self.moves.last_mut()
    }

    pub fn get(&self, index: usize) -> Option<&MoveRecord> {
        self.moves.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoveRecord> {
        self.moves.iter()
    }

    /// Most recent record made by `side`.
    pub fn last_for_side(&self, side: Side) -> Option<&MoveRecord> {
        self.moves.iter().rev().find(|record| record.side == side)
    }

    /// The previous record by the same side as the last record.
    pub fn penultimate_for_same_side(&self) -> Option<&MoveRecord> {
        let side = self.last()?.side;
        self.moves
            .iter()
            .rev()
            .skip(1)
            .find(|record| record.side == side)
    }
}

impl<'a> IntoIterator for &'a MoveLog {
    type Item = &'a MoveRecord;
    type IntoIter = std::slice::Iter<'a, MoveRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
