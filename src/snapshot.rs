//! JSON position format shared with external move sources and used for
//! persistence.
//!
//! ```json
//! {
//!   "board": [["r", "n", ...], ..., ["R", "N", ...]],
//!   "toMove": "white",
//!   "moveHistory": ["e2e4", "e7e5"],
//!   "castleRights": {"whiteKingSide": true, "whiteQueenSide": true,
//!                    "blackKingSide": true, "blackQueenSide": true},
//!   "enPassant": "e3"
//! }
//! ```
//!
//! The board is rank-major with rank 8 first. White pieces are uppercase,
//! Black lowercase, empty squares `null`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::{Board, Color, Piece, PieceKind, Square};
use crate::error::{MoveError, MoveResult};
use crate::executor::{MoveExecutor, PromotionPolicy};
use crate::notation::{validate_kings, CoordinateMove};
use crate::position::{CastlingRights, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    pub board: Vec<Vec<Option<String>>>,
    pub to_move: Color,
    pub move_history: Vec<String>,
    pub castle_rights: CastlingRights,
    #[serde(default)]
    pub en_passant: Option<String>,
}

impl From<&Position> for PositionSnapshot {
    fn from(position: &Position) -> Self {
        let board = (0..8u8)
            .rev()
            .map(|rank| {
                (0..8u8)
                    .map(|file| {
                        position
                            .board()
                            .get(Square::at(rank, file))
                            .map(|piece| piece.to_char().to_string())
                    })
                    .collect()
            })
            .collect();

        PositionSnapshot {
            board,
            to_move: position.side_to_move(),
            // Always four characters; promotions are recovered from the board on load
            move_history: position
                .history()
                .iter()
                .map(|record| format!("{}{}", record.from, record.to))
                .collect(),
            castle_rights: position.castling(),
            en_passant: position.en_passant().map(|square| square.to_string()),
        }
    }
}

impl TryFrom<PositionSnapshot> for Position {
    type Error = MoveError;

    fn try_from(snapshot: PositionSnapshot) -> MoveResult<Position> {
        let board = parse_board(&snapshot.board)?;
        validate_kings(&board)?;

        let en_passant = match snapshot.en_passant.as_deref() {
            None => None,
            Some(text) => Some(text.parse::<Square>().map_err(|_| {
                MoveError::MalformedPosition(format!("bad en passant square {:?}", text))
            })?),
        };

        let position = Position::new(board, snapshot.to_move)
            .with_castling(snapshot.castle_rights)
            .with_en_passant(en_passant);

        if snapshot.move_history.is_empty() {
            return Ok(position);
        }

        // History is kept only when it replays to exactly the stored state;
        // otherwise the stored fields win and the history is dropped.
        match replay(&snapshot.move_history, &position) {
            Ok(Some(replayed)) => Ok(replayed),
            Ok(None) => {
                warn!("move history does not lead to the stored board, dropping it");
                Ok(position)
            }
            Err(err) => {
                warn!(error = %err, "move history is unreadable, dropping it");
                Ok(position)
            }
        }
    }
}

fn parse_board(rows: &[Vec<Option<String>>]) -> MoveResult<Board> {
    if rows.len() != 8 || rows.iter().any(|row| row.len() != 8) {
        return Err(MoveError::MalformedPosition("board must be 8 by 8".to_string()));
    }

    let mut board = Board::empty();
    for (row, cells) in rows.iter().enumerate() {
        let rank = 7 - row as u8;
        for (file, cell) in cells.iter().enumerate() {
            let Some(code) = cell else {
                continue;
            };
            let square = Square::at(rank, file as u8);
            let mut chars = code.chars();
            let piece = match (chars.next(), chars.next()) {
                (Some(letter), None) => Piece::from_char(letter),
                (Some(_), Some(_)) => {
                    return Err(MoveError::MalformedPosition(format!(
                        "more than one piece on {}: {:?}",
                        square, code
                    )))
                }
                (None, _) => None,
            };
            let piece = piece.ok_or_else(|| {
                MoveError::MalformedPosition(format!("unknown piece code {:?} on {}", code, square))
            })?;
            board.set(square, Some(piece));
        }
    }
    Ok(board)
}

/// Rebuilds full move records by replaying coordinate moves from the
/// standard starting position. `None` when no line through the history
/// reaches `stored`.
fn replay(history: &[String], stored: &Position) -> MoveResult<Option<Position>> {
    let moves = history
        .iter()
        .map(|text| {
            text.parse::<CoordinateMove>()
                .map_err(|err| MoveError::MalformedPosition(format!("history entry: {}", err)))
        })
        .collect::<MoveResult<Vec<_>>>()?;
    Ok(replay_from(Position::initial(), &moves, stored))
}

// A promotion recorded without a letter is tried with every choice; the
// first line that ends on the stored state wins.
fn replay_from(
    position: Position,
    moves: &[CoordinateMove],
    stored: &Position,
) -> Option<Position> {
    let Some((mv, rest)) = moves.split_first() else {
        return reaches(&position, stored).then_some(position);
    };

    let executor = MoveExecutor::new(PromotionPolicy::Require);
    match executor.apply(&position, mv.from, mv.to, mv.promotion) {
        Ok(next) => replay_from(next, rest, stored),
        Err(MoveError::PromotionRequired { .. }) => {
            PieceKind::PROMOTION_CHOICES.iter().find_map(|&kind| {
                let next = executor.apply(&position, mv.from, mv.to, Some(kind)).ok()?;
                replay_from(next, rest, stored)
            })
        }
        Err(_) => None,
    }
}

fn reaches(replayed: &Position, stored: &Position) -> bool {
    replayed.board == stored.board
        && replayed.side_to_move == stored.side_to_move
        && replayed.castling == stored.castling
        && replayed.en_passant == stored.en_passant
}

impl Position {
    pub fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot::from(self)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }

    pub fn from_json(json: &str) -> MoveResult<Position> {
        let snapshot: PositionSnapshot = serde_json::from_str(json)
            .map_err(|err| MoveError::MalformedPosition(err.to_string()))?;
        Position::try_from(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attacks::is_square_attacked;
    use serde_json::{json, Value};

    fn play(moves: &[&str]) -> Position {
        moves.iter().fold(Position::initial(), |position, text| play_from(&position, text))
    }

    fn play_from(position: &Position, text: &str) -> Position {
        let mv: CoordinateMove = text.parse().unwrap();
        MoveExecutor::new(PromotionPolicy::AutoQueen)
            .apply(position, mv.from, mv.to, mv.promotion)
            .unwrap()
    }

    #[test]
    fn test_json_layout() {
        let position = play(&["e2e4"]);
        let value: Value = serde_json::from_str(&position.to_json().unwrap()).unwrap();

        assert_eq!(value["toMove"], json!("black"));
        assert_eq!(value["moveHistory"], json!(["e2e4"]));
        assert_eq!(value["enPassant"], json!("e3"));
        assert_eq!(
            value["castleRights"],
            json!({
                "whiteKingSide": true,
                "whiteQueenSide": true,
                "blackKingSide": true,
                "blackQueenSide": true
            })
        );
        // Rank 8 first
        assert_eq!(value["board"][0][4], json!("k"));
        assert_eq!(value["board"][7][3], json!("Q"));
        assert_eq!(value["board"][4][4], json!("P"));
        assert_eq!(value["board"][6][4], Value::Null);
    }

    #[test]
    fn test_round_trip_preserves_attacks() {
        let position = play(&["e2e4", "d7d5", "e4d5", "g8f6", "f1b5", "c7c6"]);
        let restored = Position::from_json(&position.to_json().unwrap()).unwrap();

        assert_eq!(restored, position);
        for color in [Color::White, Color::Black] {
            for square in Square::all() {
                assert_eq!(
                    is_square_attacked(&restored, square, color),
                    is_square_attacked(&position, square, color)
                );
            }
        }
    }

    #[test]
    fn test_constructed_position_without_history() {
        let json = json!({
            "board": [
                [null, null, null, null, "k", null, null, null],
                [null, null, null, null, null, null, null, null],
                [null, null, null, null, null, null, null, null],
                [null, null, null, "p", "P", null, null, null],
                [null, null, null, null, null, null, null, null],
                [null, null, null, null, null, null, null, null],
                [null, null, null, null, null, null, null, null],
                [null, null, null, null, "K", null, null, "R"]
            ],
            "toMove": "white",
            "moveHistory": [],
            "castleRights": {
                "whiteKingSide": true,
                "whiteQueenSide": false,
                "blackKingSide": false,
                "blackQueenSide": false
            },
            "enPassant": "d6"
        });
        let position = Position::from_json(&json.to_string()).unwrap();

        assert_eq!(position.en_passant(), Some("d6".parse().unwrap()));
        assert!(position.castling().white_king_side);
        assert_eq!(position.to_fen(), "4k3/8/8/3pP3/8/8/8/4K2R w K d6 0 1");
    }

    #[test]
    fn test_missing_en_passant_key() {
        let json = Position::initial().to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value.as_object_mut().unwrap().remove("enPassant");
        let position = Position::from_json(&value.to_string()).unwrap();
        assert_eq!(position.en_passant(), None);
    }

    #[test]
    fn test_malformed_positions() {
        let json = Position::initial().to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();

        // No white king
        let mut no_king = value.clone();
        no_king["board"][7][4] = Value::Null;
        assert!(matches!(
            Position::from_json(&no_king.to_string()),
            Err(MoveError::MalformedPosition(_))
        ));

        // Second white king
        let mut two_kings = value.clone();
        two_kings["board"][5][0] = json!("K");
        assert!(matches!(
            Position::from_json(&two_kings.to_string()),
            Err(MoveError::MalformedPosition(_))
        ));

        // Black king replaced by a second white one
        let mut swapped = value.clone();
        swapped["board"][0][4] = json!("K");
        assert!(matches!(
            Position::from_json(&swapped.to_string()),
            Err(MoveError::MalformedPosition(_))
        ));

        // Two pieces on one square
        let mut doubled = value.clone();
        doubled["board"][4][4] = json!("PN");
        assert!(matches!(
            Position::from_json(&doubled.to_string()),
            Err(MoveError::MalformedPosition(_))
        ));

        // Seven ranks
        value["board"].as_array_mut().unwrap().pop();
        assert!(matches!(
            Position::from_json(&value.to_string()),
            Err(MoveError::MalformedPosition(_))
        ));

        assert!(matches!(
            Position::from_json("{not json"),
            Err(MoveError::MalformedPosition(_))
        ));
    }

    #[test]
    fn test_unreplayable_history_is_dropped() {
        let position = play(&["e2e4", "e7e5"]);
        let mut value: Value = serde_json::from_str(&position.to_json().unwrap()).unwrap();
        value["moveHistory"] = json!(["d2d4", "e7e5"]);

        let restored = Position::from_json(&value.to_string()).unwrap();
        assert!(restored.history().is_empty());
        assert_eq!(restored.board(), position.board());
        assert_eq!(restored.side_to_move(), Color::White);

        value["moveHistory"] = json!(["e2e4", "nonsense"]);
        let restored = Position::from_json(&value.to_string()).unwrap();
        assert!(restored.history().is_empty());
        assert_eq!(restored.board(), position.board());
    }

    #[test]
    fn test_promotion_history_entries_have_four_characters() {
        // White's h-pawn walks through to h8 and under-promotes to a knight
        let position = play(&[
            "h2h4", "g7g5", "h4g5", "g8f6", "g5g6", "a7a6", "g6g7", "a6a5", "g7h8n",
        ]);
        let snapshot = position.snapshot();

        assert_eq!(snapshot.move_history.last().map(String::as_str), Some("g7h8"));
        assert!(snapshot.move_history.iter().all(|entry| entry.len() == 4));

        let restored = Position::try_from(snapshot).unwrap();
        assert_eq!(restored, position);
        assert_eq!(
            restored.last_move().and_then(|record| record.promotion),
            Some(PieceKind::Knight)
        );
    }

    #[test]
    fn test_history_with_promotion_letters_still_loads() {
        let position = play(&["h2h4", "g7g5", "h4g5", "g8f6", "g5g6", "a7a6", "g6g7", "a6a5"]);
        let next = play_from(&position, "g7h8q");
        let mut snapshot = next.snapshot();
        snapshot.move_history.last_mut().unwrap().push('q');

        assert_eq!(Position::try_from(snapshot).unwrap(), next);
    }

    #[test]
    fn test_snapshot_of_position_loaded_from_fen() {
        let start = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        let next = MoveExecutor::default()
            .apply(&start, "e2".parse().unwrap(), "e4".parse().unwrap(), None)
            .unwrap();

        let restored = Position::from_json(&next.to_json().unwrap()).unwrap();
        assert_eq!(restored.board(), next.board());
        assert_eq!(restored.en_passant(), Some("e3".parse().unwrap()));
    }
}
