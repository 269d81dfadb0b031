//! Pseudo-legal move generation: movement patterns and occupancy, ignoring
//! whether the mover's own king is left attacked.

use crate::attacks::{is_square_attacked, ray, slider_directions, KING_OFFSETS, KNIGHT_OFFSETS};
use crate::board::{Color, Piece, PieceKind, Square, SquareSet};
use crate::position::{CastleSide, Position};

/// Destinations the piece on `from` may move to by its pattern alone.
/// An empty square yields an empty set.
pub fn pseudo_legal_moves(position: &Position, from: Square) -> SquareSet {
    let Some(piece) = position.board().get(from) else {
        return SquareSet::EMPTY;
    };

    match piece.kind {
        PieceKind::Pawn => pawn_moves(position, from, piece.color),
        PieceKind::Knight => step_moves(position, from, piece.color, &KNIGHT_OFFSETS),
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
            slider_moves(position, from, piece)
        }
        PieceKind::King => step_moves(position, from, piece.color, &KING_OFFSETS)
            .union(castling_moves(position, from, piece.color)),
    }
}

fn is_enemy(position: &Position, square: Square, color: Color) -> bool {
    matches!(position.board().get(square), Some(piece) if piece.color != color)
}

fn pawn_moves(position: &Position, from: Square, color: Color) -> SquareSet {
    let board = position.board();
    let dir = color.pawn_direction();
    let mut moves = SquareSet::EMPTY;

    // Single and double pushes
    if let Some(one) = from.offset(dir, 0) {
        if board.is_empty(one) {
            moves.insert(one);
            if from.rank() == color.pawn_start_rank() {
                if let Some(two) = one.offset(dir, 0) {
                    if board.is_empty(two) {
                        moves.insert(two);
                    }
                }
            }
        }
    }

    // Captures, including en passant
    for df in [-1, 1] {
        let Some(target) = from.offset(dir, df) else {
            continue;
        };
        match board.get(target) {
            Some(piece) if piece.color != color => moves.insert(target),
            None if position.en_passant() == Some(target) => {
                let beside = Square::at(from.rank(), target.file());
                if board.get(beside) == Some(Piece::new(PieceKind::Pawn, color.opposite())) {
                    moves.insert(target);
                }
            }
            _ => {}
        }
    }

    moves
}

fn step_moves(position: &Position, from: Square, color: Color, offsets: &[(i8, i8)]) -> SquareSet {
    offsets
        .iter()
        .filter_map(|&(dr, df)| from.offset(dr, df))
        .filter(|&target| position.board().is_empty(target) || is_enemy(position, target, color))
        .collect()
}

fn slider_moves(position: &Position, from: Square, piece: Piece) -> SquareSet {
    let board = position.board();
    slider_directions(piece.kind)
        .iter()
        .flat_map(|&direction| ray(board, from, direction))
        .filter(|&target| board.is_empty(target) || is_enemy(position, target, piece.color))
        .collect()
}

/// King destinations two files toward a rook, when castling is available.
///
/// Requires the right to be held, the king and rook on their home squares,
/// the squares between them empty, and none of the king's current, passed or
/// destination squares attacked by the other side on the current board.
fn castling_moves(position: &Position, from: Square, color: Color) -> SquareSet {
    let board = position.board();
    let home_rank = color.back_rank();
    let mut moves = SquareSet::EMPTY;

    if from != Square::at(home_rank, 4) {
        return moves;
    }

    let enemy = color.opposite();
    for side in [CastleSide::King, CastleSide::Queen] {
        if !position.castling().has(color, side) {
            continue;
        }

        let rook_square = Square::at(home_rank, side.rook_file());
        if board.get(rook_square) != Some(Piece::new(PieceKind::Rook, color)) {
            continue;
        }

        let (low, high) = if side.rook_file() > 4 {
            (5, side.rook_file())
        } else {
            (side.rook_file() + 1, 4)
        };
        if !(low..high).all(|file| board.is_empty(Square::at(home_rank, file))) {
            continue;
        }

        let step = side.direction();
        let (Some(path), Some(destination)) =
            (from.offset(0, step), from.offset(0, 2 * step))
        else {
            continue;
        };
        if [from, path, destination]
            .iter()
            .any(|&square| is_square_attacked(position, square, enemy))
        {
            continue;
        }

        moves.insert(destination);
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::position::CastlingRights;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn piece(code: char) -> Piece {
        Piece::from_char(code).unwrap()
    }

    fn set(names: &[&str]) -> SquareSet {
        names.iter().map(|name| sq(name)).collect()
    }

    #[test]
    fn test_empty_square_has_no_moves() {
        let position = Position::initial();
        assert!(pseudo_legal_moves(&position, sq("e4")).is_empty());
    }

    #[test]
    fn test_pawn_pushes() {
        let position = Position::initial();
        assert_eq!(pseudo_legal_moves(&position, sq("e2")), set(&["e3", "e4"]));
        assert_eq!(pseudo_legal_moves(&position, sq("d7")), set(&["d6", "d5"]));

        // Blocked directly in front: no single or double push
        let board = Board::empty()
            .with(sq("e2"), piece('P'))
            .with(sq("e3"), piece('n'));
        let position = Position::new(board, Color::White);
        assert!(pseudo_legal_moves(&position, sq("e2")).is_empty());

        // Blocked on the double-push square only
        let board = Board::empty()
            .with(sq("e2"), piece('P'))
            .with(sq("e4"), piece('n'));
        let position = Position::new(board, Color::White);
        assert_eq!(pseudo_legal_moves(&position, sq("e2")), set(&["e3"]));

        // Off the starting rank, a single step only
        let board = Board::empty().with(sq("e3"), piece('P'));
        let position = Position::new(board, Color::White);
        assert_eq!(pseudo_legal_moves(&position, sq("e3")), set(&["e4"]));
    }

    #[test]
    fn test_pawn_captures() {
        let board = Board::empty()
            .with(sq("e4"), piece('P'))
            .with(sq("d5"), piece('p'))
            .with(sq("f5"), piece('N'));
        let position = Position::new(board, Color::White);
        assert_eq!(pseudo_legal_moves(&position, sq("e4")), set(&["e5", "d5"]));
    }

    #[test]
    fn test_pawn_en_passant() {
        let board = Board::empty()
            .with(sq("e5"), piece('P'))
            .with(sq("d5"), piece('p'));
        let position = Position::new(board.clone(), Color::White).with_en_passant(Some(sq("d6")));
        assert_eq!(pseudo_legal_moves(&position, sq("e5")), set(&["e6", "d6"]));

        // Target set but no enemy pawn beside the mover
        let board = Board::empty().with(sq("e5"), piece('P'));
        let position = Position::new(board, Color::White).with_en_passant(Some(sq("d6")));
        assert_eq!(pseudo_legal_moves(&position, sq("e5")), set(&["e6"]));
    }

    #[test]
    fn test_knight_moves() {
        let position = Position::initial();
        assert_eq!(pseudo_legal_moves(&position, sq("g1")), set(&["f3", "h3"]));

        let board = Board::empty()
            .with(sq("a1"), piece('n'))
            .with(sq("b3"), piece('n'))
            .with(sq("c2"), piece('P'));
        let position = Position::new(board, Color::Black);
        assert_eq!(pseudo_legal_moves(&position, sq("a1")), set(&["c2"]));
    }

    #[test]
    fn test_slider_moves() {
        let board = Board::empty()
            .with(sq("d4"), piece('R'))
            .with(sq("d6"), piece('p'))
            .with(sq("f4"), piece('P'));
        let position = Position::new(board, Color::White);
        assert_eq!(
            pseudo_legal_moves(&position, sq("d4")),
            set(&["d5", "d6", "d3", "d2", "d1", "e4", "c4", "b4", "a4"])
        );

        let position = Position::initial();
        assert!(pseudo_legal_moves(&position, sq("d1")).is_empty());
        assert!(pseudo_legal_moves(&position, sq("c8")).is_empty());

        let board = Board::empty().with(sq("a1"), piece('Q'));
        let position = Position::new(board, Color::White);
        assert_eq!(pseudo_legal_moves(&position, sq("a1")).len(), 21);
    }

    #[test]
    fn test_king_steps() {
        let board = Board::empty()
            .with(sq("e1"), piece('K'))
            .with(sq("d2"), piece('P'))
            .with(sq("f2"), piece('p'));
        let position = Position::new(board, Color::White);
        assert_eq!(
            pseudo_legal_moves(&position, sq("e1")),
            set(&["d1", "f1", "e2", "f2"])
        );
    }

    #[test]
    fn test_castling_targets() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let moves = pseudo_legal_moves(&position, sq("e1"));
        assert!(moves.contains(sq("g1")));
        assert!(moves.contains(sq("c1")));

        let position = position.with_castling(CastlingRights {
            white_queen_side: false,
            ..CastlingRights::ALL
        });
        let moves = pseudo_legal_moves(&position, sq("e1"));
        assert!(moves.contains(sq("g1")));
        assert!(!moves.contains(sq("c1")));
    }

    #[test]
    fn test_castling_blocked_or_attacked() {
        // Knight between king and rook
        let position = Position::from_fen("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1").unwrap();
        let moves = pseudo_legal_moves(&position, sq("e1"));
        assert!(!moves.contains(sq("c1")));
        assert!(moves.contains(sq("g1")));

        // Rook attacking the passed square f1
        let position = Position::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = pseudo_legal_moves(&position, sq("e1"));
        assert!(!moves.contains(sq("g1")));
        assert!(moves.contains(sq("c1")));

        // b1 attacked does not stop queenside castling
        let position = Position::from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert!(pseudo_legal_moves(&position, sq("e1")).contains(sq("c1")));

        // No castling out of check
        let position = Position::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = pseudo_legal_moves(&position, sq("e1"));
        assert!(!moves.contains(sq("g1")));
        assert!(!moves.contains(sq("c1")));
    }

    #[test]
    fn test_castling_requires_rook_on_home_square() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K2B w K - 0 1").unwrap();
        assert!(!pseudo_legal_moves(&position, sq("e1")).contains(sq("g1")));
    }
}
