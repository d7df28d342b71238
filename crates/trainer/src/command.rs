//! Parsing of terminal input into trainer commands.

use regex::Regex;
use shakmaty::{Role, Square};
use std::sync::LazyLock;

use opening_book::PlayerColor;

use crate::error::TrainerError;

/// Coordinate move as a drop: `e2e4`, `e2-e4`, `e7e8n`.
static DROP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-h][1-8])-?([a-h][1-8])([qrbnQRBN])?$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Drop {
        from: Square,
        to: Square,
        promotion: Option<Role>,
    },
    Open {
        key: String,
        color: Option<PlayerColor>,
    },
    List,
    Reset,
    Flip,
    Tree,
    Board,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  e2e4 / e7e8n        move a piece (promotion defaults to queen)
  open <key> [color]  practice an opening, optionally as white or black
  list                list openings
  reset               new game, leave practice mode
  flip                flip the board
  tree                toggle the book display
  board               show the board
  quit";

impl std::str::FromStr for Command {
    type Err = TrainerError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(TrainerError::InvalidCommand(String::new()));
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "open" | "practice" => {
                let key = words
                    .next()
                    .ok_or_else(|| TrainerError::InvalidCommand("open needs an opening key".into()))?
                    .to_string();
                let color = words
                    .next()
                    .map(|c| c.parse::<PlayerColor>())
                    .transpose()?;
                Command::Open { key, color }
            }
            "list" => Command::List,
            "reset" => Command::Reset,
            "flip" => Command::Flip,
            "tree" => Command::Tree,
            "board" => Command::Board,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return parse_drop(line),
        };

        if words.next().is_some() {
            return Err(TrainerError::InvalidCommand(line.to_string()));
        }
        Ok(command)
    }
}

fn parse_drop(line: &str) -> Result<Command, TrainerError> {
    let invalid = || TrainerError::InvalidCommand(line.to_string());
    let caps = DROP_RE.captures(line).ok_or_else(invalid)?;
    let from: Square = caps[1].parse().map_err(|_| invalid())?;
    let to: Square = caps[2].parse().map_err(|_| invalid())?;
    let promotion = match caps.get(3) {
        Some(m) => {
            let c = m.as_str().chars().next().ok_or_else(invalid)?;
            Some(Role::from_char(c.to_ascii_lowercase()).ok_or_else(invalid)?)
        }
        None => None,
    };
    Ok(Command::Drop { from, to, promotion })
}
