//! Raw attack coverage, independent of whose turn it is and of king safety.

use crate::board::{Board, Color, Piece, PieceKind, Square, SquareSet};
use crate::position::Position;

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Squares along one direction from `from`, stopping at (and including) the
/// first occupied square.
pub(crate) fn ray(
    board: &Board,
    from: Square,
    (dr, df): (i8, i8),
) -> impl Iterator<Item = Square> + '_ {
    let mut current = Some(from);
    let mut blocked = false;
    std::iter::from_fn(move || {
        if blocked {
            return None;
        }
        let next = current?.offset(dr, df)?;
        current = Some(next);
        blocked = !board.is_empty(next);
        Some(next)
    })
}

pub(crate) fn slider_directions(kind: PieceKind) -> &'static [(i8, i8)] {
    const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
        (1, 1), (1, -1), (-1, 1), (-1, -1),
        (1, 0), (-1, 0), (0, 1), (0, -1),
    ];
    match kind {
        PieceKind::Bishop => &BISHOP_DIRECTIONS,
        PieceKind::Rook => &ROOK_DIRECTIONS,
        PieceKind::Queen => &QUEEN_DIRECTIONS,
        _ => &[],
    }
}

fn offsets_from(square: Square, offsets: &[(i8, i8)]) -> SquareSet {
    offsets
        .iter()
        .filter_map(|&(dr, df)| square.offset(dr, df))
        .collect()
}

/// Squares `piece` standing on `square` attacks. Pawns attack diagonally
/// forward only; kings attack their eight neighbours and never castle here.
pub fn attacks_from(board: &Board, square: Square, piece: Piece) -> SquareSet {
    match piece.kind {
        PieceKind::Pawn => {
            let dir = piece.color.pawn_direction();
            offsets_from(square, &[(dir, -1), (dir, 1)])
        }
        PieceKind::Knight => offsets_from(square, &KNIGHT_OFFSETS),
        PieceKind::King => offsets_from(square, &KING_OFFSETS),
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => slider_directions(piece.kind)
            .iter()
            .flat_map(|&direction| ray(board, square, direction))
            .collect(),
    }
}

/// Every square attacked by at least one piece of `by`.
pub fn attacked_squares(position: &Position, by: Color) -> SquareSet {
    let board = position.board();
    board
        .pieces_of(by)
        .fold(SquareSet::EMPTY, |acc, (square, piece)| {
            acc.union(attacks_from(board, square, piece))
        })
}

/// Whether any piece of `by` attacks `square`.
///
/// Works backwards from the target: a piece of kind K attacks the square
/// exactly when a K standing on the square would see it with the mirrored
/// pattern. Gives the same answer as testing membership in
/// `attacked_squares`.
pub fn is_square_attacked(position: &Position, square: Square, by: Color) -> bool {
    let board = position.board();
    let holds = |target: Option<Square>, kind: PieceKind| {
        target.and_then(|target| board.get(target)) == Some(Piece::new(kind, by))
    };

    // Pawn attacks come from one rank behind, relative to the attacker
    let behind = -by.pawn_direction();
    if holds(square.offset(behind, -1), PieceKind::Pawn)
        || holds(square.offset(behind, 1), PieceKind::Pawn)
    {
        return true;
    }

    if KNIGHT_OFFSETS
        .iter()
        .any(|&(dr, df)| holds(square.offset(dr, df), PieceKind::Knight))
    {
        return true;
    }

    if KING_OFFSETS
        .iter()
        .any(|&(dr, df)| holds(square.offset(dr, df), PieceKind::King))
    {
        return true;
    }

    // Diagonals: bishop or queen
    for &direction in &BISHOP_DIRECTIONS {
        if let Some(blocker) = ray(board, square, direction).last() {
            if holds(Some(blocker), PieceKind::Bishop) || holds(Some(blocker), PieceKind::Queen) {
                return true;
            }
        }
    }

    // Orthogonals: rook or queen
    for &direction in &ROOK_DIRECTIONS {
        if let Some(blocker) = ray(board, square, direction).last() {
            if holds(Some(blocker), PieceKind::Rook) || holds(Some(blocker), PieceKind::Queen) {
                return true;
            }
        }
    }

    false
}
