//! Boundary to external move suggesters (network opponents, local bots).
//!
//! A source receives the serialized position and answers with a coordinate
//! move. The session validates it like any other request.

use anyhow::{anyhow, bail, Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::warn;

use crate::board::PieceKind;
use crate::legality::all_legal_moves;
use crate::notation::CoordinateMove;
use crate::position::{MoveRecord, Position};
use crate::session::GameSession;
use crate::snapshot::PositionSnapshot;

pub trait MoveSource {
    /// Suggests a move for the side to move, as a coordinate string.
    fn suggest_move(&mut self, snapshot: &PositionSnapshot) -> Result<String>;
}

/// Plays a uniformly random legal move. Promotes to a queen.
pub struct RandomMover {
    rng: StdRng,
}

impl RandomMover {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMover {
    fn default() -> Self {
        RandomMover::new()
    }
}

impl MoveSource for RandomMover {
    fn suggest_move(&mut self, snapshot: &PositionSnapshot) -> Result<String> {
        let position =
            Position::try_from(snapshot.clone()).context("unreadable position snapshot")?;
        let moves = all_legal_moves(&position);
        let &(from, to) = moves
            .choose(&mut self.rng)
            .ok_or_else(|| anyhow!("no legal moves for {}", position.side_to_move()))?;

        let promotion = match position.piece_at(from) {
            Some(piece)
                if piece.kind == PieceKind::Pawn && to.rank() == piece.color.promotion_rank() =>
            {
                Some(PieceKind::Queen)
            }
            _ => None,
        };
        Ok(CoordinateMove { from, to, promotion }.to_string())
    }
}

/// Asks `source` for a move and plays it, asking again when the suggestion
/// cannot be played, up to the session's configured number of attempts.
pub fn play_suggested_move(
    session: &mut GameSession,
    source: &mut dyn MoveSource,
) -> Result<MoveRecord> {
    let attempts = session.config().max_suggestion_attempts.max(1);
    for attempt in 1..=attempts {
        let snapshot = session.snapshot();
        let suggestion = source
            .suggest_move(&snapshot)
            .context("move source failed")?;

        match session.request_coordinate_move(&suggestion) {
            Ok(record) => return Ok(record),
            Err(err) => warn!(attempt, %suggestion, error = %err, "suggested move rejected"),
        }
    }
    bail!("move source gave no playable move in {} attempts", attempts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::legality::GameStatus;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<&'static str>);

    impl MoveSource for Scripted {
        fn suggest_move(&mut self, _snapshot: &PositionSnapshot) -> Result<String> {
            self.0
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("script exhausted"))
        }
    }

    #[test]
    fn test_random_mover_plays_legal_moves() {
        let mut session = GameSession::default();
        let mut mover = RandomMover::seeded(7);
        for _ in 0..40 {
            if matches!(session.status(), GameStatus::Checkmate | GameStatus::Stalemate) {
                break;
            }
            play_suggested_move(&mut session, &mut mover).unwrap();
        }
        assert!(!session.history().is_empty());
    }

    #[test]
    fn test_retries_after_illegal_suggestion() {
        let mut session = GameSession::default();
        let mut source = Scripted(VecDeque::from(vec!["e2e5", "e9e4", "e2e4"]));

        let record = play_suggested_move(&mut session, &mut source).unwrap();
        assert_eq!(record.coordinate(), "e2e4");
    }

    #[test]
    fn test_gives_up_after_configured_attempts() {
        let mut config = SessionConfig::default();
        config.set_max_suggestion_attempts(2);
        let mut session = GameSession::new(config);
        let mut source = Scripted(VecDeque::from(vec!["e2e5", "e7e5", "e2e4"]));

        assert!(play_suggested_move(&mut session, &mut source).is_err());
        assert!(session.history().is_empty());
        // The third scripted move was never requested
        assert_eq!(source.0.len(), 1);
    }

    #[test]
    fn test_random_mover_reports_no_moves() {
        let position = Position::from_fen("k7/2Q5/1K6/8/8/8/8/8 b - - 0 1").unwrap();
        let mut mover = RandomMover::seeded(1);
        assert!(mover.suggest_move(&position.snapshot()).is_err());
    }
}
