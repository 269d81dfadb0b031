//! Error types for move validation and position loading.

use thiserror::Error;

use crate::board::Square;

/// Errors reported by the rules core. All of them are recoverable: the
/// position a failed request was made against is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// Move requested from an empty square
    #[error("No piece at source square {0}")]
    NoPieceAtSource(Square),

    /// Destination is not a legal move for the piece (includes self-check)
    #[error("Illegal move: {from} to {to}")]
    IllegalMove { from: Square, to: Square },

    /// Pawn reached the last rank without a promotion choice
    #[error("Promotion piece required for move {from} to {to}")]
    PromotionRequired { from: Square, to: Square },

    #[error("Invalid coordinate: rank {rank}, file {file} (must be 0-7)")]
    InvalidCoordinate { rank: u8, file: u8 },

    /// Square, move or FEN text that could not be parsed
    #[error("Invalid notation: {0:?}")]
    InvalidNotation(String),

    /// Externally supplied position that breaks board invariants
    #[error("Malformed position: {0}")]
    MalformedPosition(String),
}

pub type MoveResult<T> = Result<T, MoveError>;
