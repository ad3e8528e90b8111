//! Board collaborator built on the `chess` crate.
//!
//! The contest never touches `chess::Board` directly for mutation; every ply
//! goes through [`ChessBoard::apply`] and comes back out through
//! [`ChessBoard::undo`], so the board and the history log stay in lock step.

use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, File, MoveGen, Piece, Rank, Square};

use crate::error::{GameError, Result};
use crate::game::moves::{MoveName, MoveRecord};
use crate::game::player::{PlayerStatus, Side};
use crate::game::utils::{has_insufficient_material, status_of_side_to_move};

/// Standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    board: Board,
    halfmove_clock: u32,
}

/// The live position plus enough history to undo plies and to judge
/// repetition and fifty-move claims.
#[derive(Debug, Clone)]
pub struct ChessBoard {
    start_fen: String,
    current: Board,
    halfmove_clock: u32,
    fullmove_base: u32,
    undo_stack: Vec<Snapshot>,
    position_keys: Vec<u64>,
}

impl ChessBoard {
    /// Validates `fen` and sets the board up from it.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let fen = fen.trim();
        let fields: Vec<&str> = fen.split_whitespace().collect();
        check_layout(&fields)
            .map_err(|reason| GameError::InvalidPosition(format!("{fen}: {reason}")))?;
        let current =
            Board::from_str(fen).map_err(|_| GameError::InvalidPosition(fen.to_string()))?;

        let halfmove_clock = parse_counter(fen, fields.get(4), 0)?;
        let fullmove_base = parse_counter(fen, fields.get(5), 1)?.max(1);

        Ok(Self {
            start_fen: fen.to_string(),
            current,
            halfmove_clock,
            fullmove_base,
            undo_stack: Vec::new(),
            position_keys: vec![current.get_hash()],
        })
    }

    /// The descriptor this board was set up from.
    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    pub fn is_standard_start(&self) -> bool {
        self.start_fen == START_FEN
    }

    pub fn position(&self) -> &Board {
        &self.current
    }

    pub fn side_to_move(&self) -> Side {
        self.current.side_to_move().into()
    }

    pub fn plies_played(&self) -> usize {
        self.undo_stack.len()
    }

    /// Full FEN of the current position, including move counters.
    pub fn fen(&self) -> String {
        let placement = self.current.to_string();
        let fields: Vec<&str> = placement.split_whitespace().take(4).collect();
        let black_started = self.start_side() == Side::Black;
        let fullmove =
            self.fullmove_base as usize + (self.plies_played() + black_started as usize) / 2;
        format!("{} {} {}", fields.join(" "), self.halfmove_clock, fullmove)
    }

    /// Resolves a square from its algebraic name, e.g. `e4`.
    pub fn square_named(name: &str) -> Result<Square> {
        let trimmed = name.trim();
        if trimmed.len() != 2 {
            return Err(GameError::InvalidSquare(name.to_string()));
        }
        Square::from_str(&trimmed.to_ascii_lowercase())
            .map_err(|_| GameError::InvalidSquare(name.to_string()))
    }

    /// Resolves a square from zero-based file and rank indices.
    pub fn square_at(file: i64, rank: i64) -> Result<Square> {
        if !(0..8).contains(&file) || !(0..8).contains(&rank) {
            return Err(GameError::InvalidSquare(format!("file {file} rank {rank}")));
        }
        Ok(Square::make_square(
            Rank::from_index(rank as usize),
            File::from_index(file as usize),
        ))
    }

    /// Turns "move the piece on `from` to `to` as a `name` move" into a
    /// legal move for the current position.
    pub fn resolve(&self, name: MoveName, from: Square, to: Square) -> Result<ChessMove> {
        let mover = self.current.side_to_move();
        if self.current.color_on(from) != Some(mover) {
            return Err(GameError::IllegalMove(format!(
                "no {} piece on {from}",
                Side::from(mover)
            )));
        }

        let candidate = ChessMove::new(from, to, name.promotion());
        if !self.current.legal(candidate) {
            return Err(GameError::IllegalMove(format!("{name} {from}{to}")));
        }
        let actual = self.move_name(candidate);
        if actual != name {
            return Err(GameError::IllegalMove(format!(
                "{from}{to} is a {actual} move, not {name}"
            )));
        }
        Ok(candidate)
    }

    /// Classifies a legal move of the current position.
    pub fn move_name(&self, chess_move: ChessMove) -> MoveName {
        if let Some(piece) = chess_move.get_promotion() {
            if let Some(name) = MoveName::from_promotion(piece) {
                return name;
            }
        }

        let source = chess_move.get_source();
        let dest = chess_move.get_dest();
        let file_delta = dest.get_file().to_index() as i32 - source.get_file().to_index() as i32;
        match self.current.piece_on(source) {
            Some(Piece::King) if file_delta == 2 => MoveName::CastleKingSide,
            Some(Piece::King) if file_delta == -2 => MoveName::CastleQueenSide,
            Some(Piece::Pawn) if file_delta != 0 && self.current.piece_on(dest).is_none() => {
                MoveName::EnPassant
            }
            _ => MoveName::Standard,
        }
    }

    /// Applies a legal move and returns its record. Time stamp and ply index
    /// are left for the caller to fill in.
    pub fn apply(&mut self, chess_move: ChessMove) -> Result<MoveRecord> {
        if !self.current.legal(chess_move) {
            return Err(GameError::IllegalMove(chess_move.to_string()));
        }

        let source = chess_move.get_source();
        let dest = chess_move.get_dest();
        let name = self.move_name(chess_move);
        let side = self.side_to_move();
        let piece = self
            .current
            .piece_on(source)
            .ok_or_else(|| GameError::IllegalMove(format!("no piece on {source}")))?;
        let captured = match name {
            MoveName::EnPassant => Some(Piece::Pawn),
            _ => self.current.piece_on(dest),
        };

        self.undo_stack.push(Snapshot {
            board: self.current,
            halfmove_clock: self.halfmove_clock,
        });
        self.current = self.current.make_move_new(chess_move);
        self.halfmove_clock = if piece == Piece::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove_clock + 1
        };
        self.position_keys.push(self.current.get_hash());

        Ok(MoveRecord::new(
            side,
            piece,
            source,
            dest,
            name,
            captured,
            status_of_side_to_move(&self.current),
        ))
    }

    /// Reverses the most recent ply, which must be `record`.
    pub fn undo(&mut self, record: &MoveRecord) -> Result<()> {
        let snapshot = self.undo_stack.pop().ok_or_else(|| {
            GameError::EngineInvariant(format!("undo of {record} with no applied plies"))
        })?;
        debug_assert_eq!(snapshot.board.piece_on(record.from()), Some(record.piece()));
        self.current = snapshot.board;
        self.halfmove_clock = snapshot.halfmove_clock;
        self.position_keys.pop();
        Ok(())
    }

    /// Status of `side` in the current position.
    pub fn status(&self, side: Side) -> PlayerStatus {
        if self.side_to_move() == side {
            status_of_side_to_move(&self.current)
        } else {
            PlayerStatus::Normal
        }
    }

    pub fn can_move(&self) -> bool {
        self.current.status() == BoardStatus::Ongoing
    }

    pub fn is_checkmate(&self) -> bool {
        self.current.status() == BoardStatus::Checkmate
    }

    pub fn is_in_check(&self) -> bool {
        self.current.checkers().popcnt() > 0
    }

    pub fn can_claim_three_fold_repetition(&self) -> bool {
        let key = self.current.get_hash();
        self.position_keys.iter().filter(|&&k| k == key).count() >= 3
    }

    pub fn can_claim_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    pub fn can_claim_insufficient_material_draw(&self) -> bool {
        has_insufficient_material(&self.current)
    }

    pub fn legal_moves_from(&self, square: Square) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.current)
            .filter(|m| m.get_source() == square)
            .collect()
    }

    fn start_side(&self) -> Side {
        match self.undo_stack.first() {
            Some(snapshot) => snapshot.board.side_to_move().into(),
            None => self.side_to_move(),
        }
    }
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self {
            start_fen: START_FEN.to_string(),
            current: Board::default(),
            halfmove_clock: 0,
            fullmove_base: 1,
            undo_stack: Vec::new(),
            position_keys: vec![Board::default().get_hash()],
        }
    }
}

/// Checks what `chess::Board` takes on trust: eight ranks of eight files,
/// one king a side and an en-passant target on the third or sixth rank.
fn check_layout(fields: &[&str]) -> std::result::Result<(), String> {
    let placement = fields.first().copied().unwrap_or_default();
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(format!("{} ranks", ranks.len()));
    }

    let mut kings = [0; 2];
    for rank in &ranks {
        let mut files = 0;
        for c in rank.chars() {
            match c {
                '1'..='8' => files += c as u32 - '0' as u32,
                'K' => {
                    kings[0] += 1;
                    files += 1;
                }
                'k' => {
                    kings[1] += 1;
                    files += 1;
                }
                'P' | 'N' | 'B' | 'R' | 'Q' | 'p' | 'n' | 'b' | 'r' | 'q' => files += 1,
                other => return Err(format!("unexpected '{other}' in {rank}")),
            }
        }
        if files != 8 {
            return Err(format!("rank {rank} spans {files} files"));
        }
    }
    if kings != [1, 1] {
        return Err(format!("{} white and {} black kings", kings[0], kings[1]));
    }

    match fields.get(3).copied() {
        None | Some("-") => Ok(()),
        Some(target) => match ChessBoard::square_named(target) {
            Ok(square) if matches!(square.get_rank(), Rank::Third | Rank::Sixth) => Ok(()),
            _ => Err(format!("en passant target {target}")),
        },
    }
}

fn parse_counter(fen: &str, field: Option<&&str>, default: u32) -> Result<u32> {
    match field {
        Some(value) => value
            .parse()
            .map_err(|_| GameError::InvalidPosition(fen.to_string())),
        None => Ok(default),
    }
}
