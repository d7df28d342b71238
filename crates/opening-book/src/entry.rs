use serde::{Deserialize, Serialize};
use shakmaty::Color;
use std::collections::HashMap;
use std::fmt;

use crate::error::BookError;

/// Space-joined SAN history from the initial position ("" = start).
pub type PositionKey = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    pub fn opponent(self) -> Self {
        match self {
            PlayerColor::White => PlayerColor::Black,
            PlayerColor::Black => PlayerColor::White,
        }
    }

    /// Side to move after `plies` half-moves from the initial position.
    pub fn to_move_after(plies: usize) -> Self {
        if plies % 2 == 0 { PlayerColor::White } else { PlayerColor::Black }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerColor::White => "white",
            PlayerColor::Black => "black",
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlayerColor {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(PlayerColor::White),
            "black" | "b" => Ok(PlayerColor::Black),
            other => Err(BookError::InvalidColor(other.to_string())),
        }
    }
}

impl From<Color> for PlayerColor {
    fn from(color: Color) -> Self {
        match color {
            Color::White => PlayerColor::White,
            Color::Black => PlayerColor::Black,
        }
    }
}

impl From<PlayerColor> for Color {
    fn from(color: PlayerColor) -> Self {
        match color {
            PlayerColor::White => Color::White,
            PlayerColor::Black => Color::Black,
        }
    }
}

/// How an opening's expected moves are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningLine {
    /// One fixed line, indexed by ply.
    Sequence(Vec<String>),
    /// Allowed moves per position, keyed by the SAN history leading to it.
    Tree(HashMap<PositionKey, Vec<String>>),
}

impl OpeningLine {
    /// Number of positions the line gives guidance for.
    pub fn positions(&self) -> usize {
        match self {
            OpeningLine::Sequence(moves) => moves.len(),
            OpeningLine::Tree(tree) => tree.len(),
        }
    }
}

/// A named opening the trainee can practice. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningEntry {
    pub key: String,
    pub name: String,
    pub player_color: PlayerColor,
    pub line: OpeningLine,
}

impl OpeningEntry {
    pub fn sequence(key: &str, name: &str, player_color: PlayerColor, moves: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            player_color,
            line: OpeningLine::Sequence(moves.iter().map(|s| s.to_string()).collect()),
        }
    }

    /// Build a tree entry from `(position key, space-separated moves)` pairs.
    pub fn tree(key: &str, name: &str, player_color: PlayerColor, nodes: &[(&str, &str)]) -> Self {
        let tree = nodes
            .iter()
            .map(|(key, moves)| {
                (key.to_string(), moves.split_whitespace().map(String::from).collect())
            })
            .collect();
        Self {
            key: key.to_string(),
            name: name.to_string(),
            player_color,
            line: OpeningLine::Tree(tree),
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self.line, OpeningLine::Tree(_))
    }
}

/// Listing row returned by `OpeningBook::list_openings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpeningSummary {
    pub key: String,
    pub name: String,
    pub player_color: PlayerColor,
}

/// Join a SAN history into the key used to index opening trees.
pub fn position_key<S: AsRef<str>>(history: &[S]) -> PositionKey {
    history
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip check and mate markers so `Bb5+` compares equal to `Bb5`.
pub fn normalize_san(san: &str) -> &str {
    san.trim().trim_end_matches(['+', '#'])
}
