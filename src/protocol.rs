//! Line-oriented command protocol over stdin/stdout.
//!
//! ```text
//! reset | new            start a new game
//! move e2e4 | e7e8q      play a coordinate move
//! legal e2               list legal destinations
//! status                 normal | check | checkmate | stalemate
//! board | fen | json     print the position
//! history                list played moves
//! position fen <fen>     load a FEN position
//! position json <json>   load a JSON snapshot
//! ai                     let the built-in random opponent move
//! quit
//! ```

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::board::Square;
use crate::config::SessionConfig;
use crate::opponent::{play_suggested_move, RandomMover};
use crate::session::GameSession;

pub struct CommandHandler {
    session: GameSession,
    opponent: RandomMover,
}

impl CommandHandler {
    pub fn new(config: SessionConfig) -> Self {
        CommandHandler {
            session: GameSession::new(config),
            opponent: RandomMover::new(),
        }
    }

    pub fn with_opponent(config: SessionConfig, opponent: RandomMover) -> Self {
        CommandHandler {
            session: GameSession::new(config),
            opponent,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        while reader.read_line(&mut line)? > 0 {
            let command = line.trim();
            if command == "quit" {
                break;
            }

            let response = self.handle_command(command)?;
            write!(stdout, "{}", response)?;
            stdout.flush()?;
            line.clear();
        }
        Ok(())
    }

    /// Executes one command and returns the text to print. Rule violations
    /// are reported as `error: ...` lines, not as `Err`.
    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok("".to_string());
        }

        let response = match parts[0] {
            "reset" | "new" => {
                self.session.reset();
                "ok\n".to_string()
            }
            "move" => self.handle_move(&parts[1..]),
            "legal" => self.handle_legal(&parts[1..]),
            "status" => format!("{}\n", self.session.status()),
            "board" => self.session.position().board().to_string(),
            "fen" => format!("{}\n", self.session.position().to_fen()),
            "json" => format!("{}\n", self.session.position().to_json()?),
            "history" => self.handle_history(),
            "position" => self.handle_position(command, &parts[1..]),
            "ai" => match play_suggested_move(&mut self.session, &mut self.opponent) {
                Ok(record) => format!("move {}\n", record),
                Err(err) => format!("error: {:#}\n", err),
            },
            "quit" => "".to_string(),
            other => format!("error: unknown command {:?}\n", other),
        };
        Ok(response)
    }

    fn handle_move(&mut self, args: &[&str]) -> String {
        let Some(text) = args.first() else {
            return "error: move needs a coordinate move such as e2e4\n".to_string();
        };
        match self.session.request_coordinate_move(text) {
            Ok(record) => format!("ok {} {}\n", record, self.session.status()),
            Err(err) => format!("error: {}\n", err),
        }
    }

    fn handle_legal(&self, args: &[&str]) -> String {
        let square = match args.first().map(|text| text.parse::<Square>()) {
            Some(Ok(square)) => square,
            Some(Err(err)) => return format!("error: {}\n", err),
            None => return "error: legal needs a square such as e2\n".to_string(),
        };
        let mut destinations: Vec<String> = self
            .session
            .legal_destinations(square)
            .iter()
            .map(|square| square.to_string())
            .collect();
        destinations.sort();
        format!("{}\n", destinations.join(" "))
    }

    fn handle_history(&self) -> String {
        let moves: Vec<String> = self
            .session
            .history()
            .iter()
            .map(|record| record.coordinate())
            .collect();
        format!("{}\n", moves.join(" "))
    }

    fn handle_position(&mut self, command: &str, args: &[&str]) -> String {
        // Everything after the format keyword, whitespace preserved
        let payload = |keyword: &str| {
            command
                .split_once(keyword)
                .map(|(_, rest)| rest.trim())
                .unwrap_or_default()
        };
        let result = match args.first() {
            Some(&"fen") => self.session.load_fen(payload("fen")),
            Some(&"json") => self.session.load_json(payload("json")),
            Some(&"startpos") => {
                self.session.reset();
                Ok(())
            }
            _ => return "error: position needs fen, json or startpos\n".to_string(),
        };
        match result {
            Ok(()) => "ok\n".to_string(),
            Err(err) => format!("error: {}\n", err),
        }
    }
}
