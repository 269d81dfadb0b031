pub mod attacks;
pub mod board;
pub mod config;
pub mod error;
pub mod executor;
pub mod legality;
pub mod movegen;
pub mod notation;
pub mod opponent;
pub mod position;
pub mod protocol;
pub mod session;
pub mod snapshot;

pub use board::{Board, Color, Piece, PieceKind, Square, SquareSet};
pub use config::SessionConfig;
pub use error::{MoveError, MoveResult};
pub use executor::{MoveExecutor, PromotionPolicy};
pub use legality::{DrawReason, GameStatus};
pub use position::{CastleSide, CastlingRights, MoveRecord, Position};
pub use session::{GameSession, SharedSession};
pub use snapshot::PositionSnapshot;
