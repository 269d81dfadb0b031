//! Applies validated moves, producing new positions.

use crate::board::{Color, Piece, PieceKind, Square};
use crate::error::{MoveError, MoveResult};
use crate::legality::legal_moves;
use crate::position::{CastleSide, MoveRecord, Position};

/// What to do when a pawn reaches the last rank without a promotion choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromotionPolicy {
    /// Fail with `MoveError::PromotionRequired`.
    #[default]
    Require,
    /// Promote to a queen.
    AutoQueen,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveExecutor {
    promotion_policy: PromotionPolicy,
}

impl MoveExecutor {
    pub fn new(promotion_policy: PromotionPolicy) -> Self {
        Self { promotion_policy }
    }

    pub fn promotion_policy(&self) -> PromotionPolicy {
        self.promotion_policy
    }

    /// Validates and applies a move, returning the resulting position.
    /// The input position is never modified.
    pub fn apply(
        &self,
        position: &Position,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> MoveResult<Position> {
        self.execute(position, from, to, promotion)
            .map(|(next, _)| next)
    }

    /// Like [`apply`](Self::apply), also returning the record that was
    /// appended to the new position's history.
    pub fn execute(
        &self,
        position: &Position,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> MoveResult<(Position, MoveRecord)> {
        let piece = position
            .board()
            .get(from)
            .ok_or(MoveError::NoPieceAtSource(from))?;

        if piece.color != position.side_to_move() || !legal_moves(position, from).contains(to) {
            return Err(MoveError::IllegalMove { from, to });
        }

        let promotes = piece.kind == PieceKind::Pawn && to.rank() == piece.color.promotion_rank();
        let promotion = if promotes {
            match (promotion, self.promotion_policy) {
                (Some(kind), _) if kind.is_promotion_choice() => Some(kind),
                (Some(_), _) => return Err(MoveError::IllegalMove { from, to }),
                (None, PromotionPolicy::AutoQueen) => Some(PieceKind::Queen),
                (None, PromotionPolicy::Require) => {
                    return Err(MoveError::PromotionRequired { from, to })
                }
            }
        } else {
            None
        };

        Ok(play_unchecked(position, from, to, piece, promotion))
    }
}

/// Plays a move without legality checks. Used for committing validated
/// moves and for simulating candidates during legality filtering.
///
/// `piece` is the piece standing on `from`. The returned position owns its
/// own copy of the board.
pub(crate) fn play_unchecked(
    position: &Position,
    from: Square,
    to: Square,
    piece: Piece,
    promotion: Option<PieceKind>,
) -> (Position, MoveRecord) {
    let mut next = position.clone();
    next.board.take(from);

    let mut captured = next.board.take(to);
    let mut castle = None;
    let mut is_en_passant = false;

    match piece.kind {
        PieceKind::King if from.file().abs_diff(to.file()) == 2 => {
            let side = if to.file() > from.file() {
                CastleSide::King
            } else {
                CastleSide::Queen
            };
            let rook_from = Square::at(from.rank(), side.rook_file());
            let rook_to = Square::at(from.rank(), side.rook_target_file());
            if let Some(rook) = next.board.take(rook_from) {
                next.board.set(rook_to, Some(rook));
            }
            castle = Some(side);
        }
        PieceKind::Pawn
            if captured.is_none()
                && from.file() != to.file()
                && position.en_passant() == Some(to) =>
        {
            // The captured pawn stands beside the mover, not on the target
            captured = next.board.take(Square::at(from.rank(), to.file()));
            is_en_passant = true;
        }
        _ => {}
    }

    let placed = match promotion {
        Some(kind) if piece.kind == PieceKind::Pawn => Piece::new(kind, piece.color),
        _ => piece,
    };
    next.board.set(to, Some(placed));

    if piece.kind == PieceKind::King {
        next.castling.clear_color(piece.color);
    }
    next.castling.clear_rook_square(from);
    next.castling.clear_rook_square(to);

    next.en_passant = if piece.kind == PieceKind::Pawn && from.rank().abs_diff(to.rank()) == 2 {
        Some(Square::at((from.rank() + to.rank()) / 2, from.file()))
    } else {
        None
    };

    let is_capture = captured.is_some();
    if piece.kind == PieceKind::Pawn || is_capture {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);
    }
    if position.side_to_move() == Color::Black {
        next.fullmove_number = next.fullmove_number.saturating_add(1);
    }
    next.side_to_move = position.side_to_move().opposite();

    let record = MoveRecord {
        from,
        to,
        moved_piece: piece,
        is_capture,
        castle,
        is_en_passant,
        promotion: promotion.filter(|_| piece.kind == PieceKind::Pawn),
    };
    next.history.push(record);

    (next, record)
}
