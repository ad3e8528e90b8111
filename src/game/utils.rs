use chess::{Board, BoardStatus, Color, Piece, ALL_SQUARES};

use crate::game::player::{PlayerStatus, Side};

/// Convert a side to the lowercase word used on the wire
pub fn side_to_string(side: Side) -> String {
    side.to_string()
}

/// Get the status string for the side to move on `board`
pub fn get_game_status(board: &Board) -> String {
    match board.status() {
        BoardStatus::Checkmate => match board.side_to_move() {
            Color::White => "black_wins".to_string(),
            Color::Black => "white_wins".to_string(),
        },
        BoardStatus::Stalemate => "stalemate".to_string(),
        BoardStatus::Ongoing => {
            if board.checkers().popcnt() > 0 {
                "check".to_string()
            } else if board.side_to_move() == Color::White {
                "white_turn".to_string()
            } else {
                "black_turn".to_string()
            }
        }
    }
}

/// Status of the side to move on `board`
pub fn status_of_side_to_move(board: &Board) -> PlayerStatus {
    match board.status() {
        BoardStatus::Checkmate => PlayerStatus::InCheckMate,
        BoardStatus::Stalemate => PlayerStatus::InStaleMate,
        BoardStatus::Ongoing if board.checkers().popcnt() > 0 => PlayerStatus::InCheck,
        BoardStatus::Ongoing => PlayerStatus::Normal,
    }
}

/// Check if the board has insufficient material for checkmate
pub fn has_insufficient_material(board: &Board) -> bool {
    // Any pawn, rook or queen can still mate
    let heavy =
        *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
    if heavy.popcnt() > 0 {
        return false;
    }

    let mut minors = [0u32; 2];
    // Bishop square colours per side: [light, dark]
    let mut bishop_colours = [[false; 2]; 2];

    for square in ALL_SQUARES {
        let piece = match board.piece_on(square) {
            Some(piece) => piece,
            None => continue,
        };
        let owner = match board.color_on(square) {
            Some(Color::White) => 0,
            Some(Color::Black) => 1,
            None => continue,
        };
        match piece {
            Piece::Knight => minors[owner] += 1,
            Piece::Bishop => {
                minors[owner] += 1;
                let dark = (square.get_rank().to_index() + square.get_file().to_index()) % 2 == 0;
                bishop_colours[owner][dark as usize] = true;
            }
            _ => {} // Kings are always present
        }
    }

    match (minors[0], minors[1]) {
        // King vs King, or a lone minor piece against a bare king
        (0, 0) | (1, 0) | (0, 1) => true,
        // King and Bishop vs King and Bishop with bishops on the same colour
        (1, 1) => {
            let white_bishop = *board.pieces(Piece::Bishop) & *board.color_combined(Color::White);
            let black_bishop = *board.pieces(Piece::Bishop) & *board.color_combined(Color::Black);
            white_bishop.popcnt() == 1
                && black_bishop.popcnt() == 1
                && bishop_colours[0] == bishop_colours[1]
        }
        // All other positions have sufficient material for checkmate
        _ => false,
    }
}
