//! Text notations: coordinate moves ("e2e4", "e7e8q") and FEN.

use crate::board::{Board, Color, Piece, PieceKind, Square};
use crate::error::{MoveError, MoveResult};
use crate::position::{CastlingRights, Position};

/// A move in coordinate form, as exchanged with external move sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl std::str::FromStr for CoordinateMove {
    type Err = MoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() || (s.len() != 4 && s.len() != 5) {
            return Err(MoveError::InvalidNotation(s.to_string()));
        }

        let from = s[0..2].parse()?;
        let to = s[2..4].parse()?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(letter) => match PieceKind::from_letter(letter) {
                Some(kind) if kind.is_promotion_choice() => Some(kind),
                _ => return Err(MoveError::InvalidNotation(s.to_string())),
            },
        };

        Ok(CoordinateMove { from, to, promotion })
    }
}

impl std::fmt::Display for CoordinateMove {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

/// Rejects boards that do not carry exactly one king per side.
pub(crate) fn validate_kings(board: &Board) -> MoveResult<()> {
    for color in [Color::White, Color::Black] {
        let kings = board.count(PieceKind::King, color);
        if kings != 1 {
            return Err(MoveError::MalformedPosition(format!(
                "expected one {} king, found {}",
                color, kings
            )));
        }
    }
    Ok(())
}

fn malformed(fen: &str, reason: &str) -> MoveError {
    MoveError::MalformedPosition(format!("{} in FEN {:?}", reason, fen))
}

impl Position {
    pub fn from_fen(fen: &str) -> MoveResult<Position> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(MoveError::InvalidNotation(fen.to_string()));
        }

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(malformed(fen, "expected 8 ranks"));
        }

        let mut board = Board::empty();
        for (row, text) in ranks.iter().enumerate() {
            let rank = 7 - row as u8;
            let mut file = 0u8;
            for code in text.chars() {
                if let Some(skip) = code.to_digit(10) {
                    file = file.saturating_add(skip as u8);
                } else {
                    let piece =
                        Piece::from_char(code).ok_or_else(|| malformed(fen, "unknown piece"))?;
                    if file > 7 {
                        return Err(malformed(fen, "rank too long"));
                    }
                    board.set(Square::at(rank, file), Some(piece));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(malformed(fen, "rank does not cover 8 files"));
            }
        }
        validate_kings(&board)?;

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(malformed(fen, "bad side to move")),
        };

        let mut castling = CastlingRights::NONE;
        if fields[2] != "-" {
            for flag in fields[2].chars() {
                match flag {
                    'K' => castling.white_king_side = true,
                    'Q' => castling.white_queen_side = true,
                    'k' => castling.black_king_side = true,
                    'q' => castling.black_queen_side = true,
                    _ => return Err(malformed(fen, "bad castling field")),
                }
            }
        }

        let en_passant = match fields[3] {
            "-" => None,
            square => Some(square.parse::<Square>()?),
        };

        let halfmove_clock = match fields.get(4) {
            Some(text) => text.parse().map_err(|_| malformed(fen, "bad halfmove clock"))?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(text) => text.parse().map_err(|_| malformed(fen, "bad fullmove number"))?,
            None => 1,
        };

        Ok(Position::new(board, side_to_move)
            .with_castling(castling)
            .with_en_passant(en_passant)
            .with_clocks(halfmove_clock, fullmove_number))
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.board.get(Square::at(rank, file)) {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        for (held, flag) in [
            (self.castling.white_king_side, 'K'),
            (self.castling.white_queen_side, 'Q'),
            (self.castling.black_king_side, 'k'),
            (self.castling.black_queen_side, 'q'),
        ] {
            if held {
                castling.push(flag);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), |square| square.to_string());

        format!(
            "{} {} {} {} {} {}",
            placement, side, castling, en_passant, self.halfmove_clock, self.fullmove_number
        )
    }
}
