use std::fmt;

use crate::attacks::is_square_attacked;
use crate::board::{Color, PieceKind, Square, SquareSet};
use crate::executor::play_unchecked;
use crate::movegen::pseudo_legal_moves;
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Normal,
    Check,
    Checkmate,
    Stalemate,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            GameStatus::Normal => "normal",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
        };
        write!(f, "{}", name)
    }
}

/// Draw conditions a player could claim. Reported only, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    FiftyMoveRule,
    InsufficientMaterial,
}

/// Whether `color`'s king is attacked. A side without a king is never in check.
pub fn is_king_in_check(position: &Position, color: Color) -> bool {
    match position.board().king_square(color) {
        Some(king_square) => is_square_attacked(position, king_square, color.opposite()),
        None => false,
    }
}

/// Pseudo-legal destinations of the piece on `from` that do not leave its
/// own king attacked. Each candidate is played on a private copy of the
/// position and tested there.
pub fn legal_moves(position: &Position, from: Square) -> SquareSet {
    let Some(piece) = position.board().get(from) else {
        return SquareSet::EMPTY;
    };

    pseudo_legal_moves(position, from)
        .iter()
        .filter(|&to| {
            let (next, _) = play_unchecked(position, from, to, piece, None);
            !is_king_in_check(&next, piece.color)
        })
        .collect()
}

/// Every legal `(from, to)` pair for the side to move.
pub fn all_legal_moves(position: &Position) -> Vec<(Square, Square)> {
    position
        .board()
        .pieces_of(position.side_to_move())
        .flat_map(|(from, _)| legal_moves(position, from).into_iter().map(move |to| (from, to)))
        .collect()
}

pub fn has_legal_move(position: &Position) -> bool {
    position
        .board()
        .pieces_of(position.side_to_move())
        .any(|(from, _)| !legal_moves(position, from).is_empty())
}

pub fn game_status(position: &Position) -> GameStatus {
    let in_check = is_king_in_check(position, position.side_to_move());
    match (has_legal_move(position), in_check) {
        (false, true) => GameStatus::Checkmate,
        (false, false) => GameStatus::Stalemate,
        (true, true) => GameStatus::Check,
        (true, false) => GameStatus::Normal,
    }
}

pub fn draw_claim(position: &Position) -> Option<DrawReason> {
    if is_insufficient_material(position) {
        Some(DrawReason::InsufficientMaterial)
    } else if position.halfmove_clock() >= 100 {
        Some(DrawReason::FiftyMoveRule)
    } else {
        None
    }
}

fn is_insufficient_material(position: &Position) -> bool {
    let board = position.board();
    let mut minors = Vec::new();
    for (square, piece) in board.pieces() {
        match piece.kind {
            PieceKind::King => {}
            PieceKind::Knight | PieceKind::Bishop => minors.push((square, piece)),
            PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
        }
    }

    match minors.as_slice() {
        // King vs king, or king and one minor vs king
        [] | [_] => true,
        // Bishops of both sides on the same square color
        [(first, a), (second, b)] => {
            a.kind == PieceKind::Bishop
                && b.kind == PieceKind::Bishop
                && a.color != b.color
                && first.is_light() == second.is_light()
        }
        _ => false,
    }
}
