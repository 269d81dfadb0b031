//! Game orchestration: owns the live position and exposes the operations a
//! presentation layer or an external opponent drives the game with.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::board::{Color, PieceKind, Square, SquareSet};
use crate::config::SessionConfig;
use crate::error::MoveResult;
use crate::executor::MoveExecutor;
use crate::legality::{draw_claim, game_status, legal_moves, DrawReason, GameStatus};
use crate::notation::CoordinateMove;
use crate::position::{MoveRecord, Position};
use crate::snapshot::PositionSnapshot;

pub struct GameSession {
    position: Position,
    executor: MoveExecutor,
    config: SessionConfig,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            position: Position::initial(),
            executor: MoveExecutor::new(config.promotion_policy),
            config,
        }
    }

    /// A session continuing from an existing position.
    pub fn from_position(position: Position, config: SessionConfig) -> Self {
        Self {
            position,
            executor: MoveExecutor::new(config.promotion_policy),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    pub fn history(&self) -> &[MoveRecord] {
        self.position.history()
    }

    pub fn status(&self) -> GameStatus {
        game_status(&self.position)
    }

    pub fn draw_claim(&self) -> Option<DrawReason> {
        draw_claim(&self.position)
    }

    /// Legal destinations for the piece on `square`. Empty for empty squares
    /// and for pieces of the side not to move.
    pub fn legal_destinations(&self, square: Square) -> SquareSet {
        match self.position.piece_at(square) {
            Some(piece) if piece.color == self.position.side_to_move() => {
                legal_moves(&self.position, square)
            }
            _ => SquareSet::EMPTY,
        }
    }

    /// Validates and commits a move. On error the held position is unchanged.
    pub fn request_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> MoveResult<MoveRecord> {
        match self.executor.execute(&self.position, from, to, promotion) {
            Ok((next, record)) => {
                self.position = next;
                info!(
                    mv = %record,
                    side = %record.moved_piece.color,
                    capture = record.is_capture,
                    "move committed"
                );
                Ok(record)
            }
            Err(err) => {
                debug!(%from, %to, error = %err, "move rejected");
                Err(err)
            }
        }
    }

    /// Parses a coordinate move such as "e7e5" or "e7e8q" and requests it.
    pub fn request_coordinate_move(&mut self, text: &str) -> MoveResult<MoveRecord> {
        let mv: CoordinateMove = text.trim().parse()?;
        self.request_move(mv.from, mv.to, mv.promotion)
    }

    /// Restores the standard starting position, clearing history.
    pub fn reset(&mut self) {
        self.position = Position::initial();
        info!("session reset");
    }

    pub fn snapshot(&self) -> PositionSnapshot {
        self.position.snapshot()
    }

    /// Replaces the held position with one loaded from external JSON.
    pub fn load_json(&mut self, json: &str) -> MoveResult<()> {
        let position = Position::from_json(json)?;
        self.load(position);
        Ok(())
    }

    pub fn load_fen(&mut self, fen: &str) -> MoveResult<()> {
        let position = Position::from_fen(fen)?;
        self.load(position);
        Ok(())
    }

    fn load(&mut self, position: Position) {
        info!(fen = %position.to_fen(), "position loaded");
        self.position = position;
    }
}

impl Default for GameSession {
    fn default() -> Self {
        GameSession::new(SessionConfig::default())
    }
}

/// A session handle that can be shared between threads. Every call takes
/// the session lock, so at most one move is in flight at a time.
#[derive(Clone, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<GameSession>>,
}

impl SharedSession {
    pub fn new(session: GameSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn request_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> MoveResult<MoveRecord> {
        self.inner.lock().request_move(from, to, promotion)
    }

    pub fn request_coordinate_move(&self, text: &str) -> MoveResult<MoveRecord> {
        self.inner.lock().request_coordinate_move(text)
    }

    pub fn legal_destinations(&self, square: Square) -> SquareSet {
        self.inner.lock().legal_destinations(square)
    }

    pub fn status(&self) -> GameStatus {
        self.inner.lock().status()
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// A copy of the current position, consistent at the time of the call.
    pub fn position(&self) -> Position {
        self.inner.lock().position().clone()
    }

    /// Runs `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut GameSession) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
