use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Piece, PieceKind, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub fn rook_file(self) -> u8 {
        match self {
            CastleSide::King => 7,
            CastleSide::Queen => 0,
        }
    }

    pub fn rook_target_file(self) -> u8 {
        match self {
            CastleSide::King => 5,
            CastleSide::Queen => 3,
        }
    }

    /// File step from the king toward the rook.
    pub fn direction(self) -> i8 {
        match self {
            CastleSide::King => 1,
            CastleSide::Queen => -1,
        }
    }
}

/// The four castling flags. A cleared flag is never set again by play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        white_king_side: true,
        white_queen_side: true,
        black_king_side: true,
        black_queen_side: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        white_king_side: false,
        white_queen_side: false,
        black_king_side: false,
        black_queen_side: false,
    };

    fn flag_mut(&mut self, color: Color, side: CastleSide) -> &mut bool {
        match (color, side) {
            (Color::White, CastleSide::King) => &mut self.white_king_side,
            (Color::White, CastleSide::Queen) => &mut self.white_queen_side,
            (Color::Black, CastleSide::King) => &mut self.black_king_side,
            (Color::Black, CastleSide::Queen) => &mut self.black_queen_side,
        }
    }

    pub fn has(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::King) => self.white_king_side,
            (Color::White, CastleSide::Queen) => self.white_queen_side,
            (Color::Black, CastleSide::King) => self.black_king_side,
            (Color::Black, CastleSide::Queen) => self.black_queen_side,
        }
    }

    pub fn clear(&mut self, color: Color, side: CastleSide) {
        *self.flag_mut(color, side) = false;
    }

    pub fn clear_color(&mut self, color: Color) {
        self.clear(color, CastleSide::King);
        self.clear(color, CastleSide::Queen);
    }

    /// Clears the right tied to a rook home square, if `square` is one.
    pub fn clear_rook_square(&mut self, square: Square) {
        for color in [Color::White, Color::Black] {
            for side in [CastleSide::King, CastleSide::Queen] {
                if square == Square::at(color.back_rank(), side.rook_file()) {
                    self.clear(color, side);
                }
            }
        }
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        CastlingRights::ALL
    }
}

/// A committed move, as appended to a position's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub moved_piece: Piece,
    pub is_capture: bool,
    pub castle: Option<CastleSide>,
    pub is_en_passant: bool,
    pub promotion: Option<PieceKind>,
}

impl MoveRecord {
    /// Coordinate form, e.g. "e2e4" or "e7e8q".
    pub fn coordinate(&self) -> String {
        let mut result = format!("{}{}", self.from, self.to);
        if let Some(kind) = self.promotion {
            result.push(kind.letter());
        }
        result
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.coordinate())
    }
}

/// Board state plus everything needed to decide legality of the next move.
///
/// Positions are only produced by the initial-setup constructors, the loaders
/// in `notation`/`snapshot`, and the move executor. None of them is mutated
/// after it has been handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub(crate) board: Board,
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) history: Vec<MoveRecord>,
}

impl Position {
    pub fn initial() -> Self {
        Self {
            board: Board::standard(),
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    /// A position over an arbitrary board, with no castling rights and no
    /// en passant target.
    pub fn new(board: Board, side_to_move: Color) -> Self {
        Self {
            board,
            side_to_move,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    pub fn with_castling(mut self, castling: CastlingRights) -> Self {
        self.castling = castling;
        self
    }

    pub fn with_en_passant(mut self, en_passant: Option<Square>) -> Self {
        self.en_passant = en_passant;
        self
    }

    pub fn with_clocks(mut self, halfmove_clock: u32, fullmove_number: u32) -> Self {
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.get(square)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::initial()
    }
}
