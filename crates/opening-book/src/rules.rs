//! Rules-engine seam.
//!
//! Legality, check detection and SAN encoding belong to the rules engine.
//! The book only needs `LegalMoves`; hosts drive a full `RulesEngine`.

use shakmaty::{
    fen::Fen, san::San, uci::UciMove, Chess, EnPassantMode, Position, Role, Square,
};

use crate::entry::{normalize_san, PlayerColor};

/// Outcome of asking the rules engine to play a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    Accepted { san: String, history: Vec<String> },
    Rejected,
}

impl MoveResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, MoveResult::Accepted { .. })
    }
}

/// Legality oracle for the live position.
pub trait LegalMoves {
    fn is_legal_san(&self, san: &str) -> bool;
}

pub trait RulesEngine: LegalMoves {
    /// Play a from/to/promotion move, as a board widget drop would.
    fn try_move(&mut self, from: Square, to: Square, promotion: Option<Role>) -> MoveResult;
    fn play_san(&mut self, san: &str) -> MoveResult;
    /// Take back the last move. Returns false at the start position.
    fn undo(&mut self) -> bool;
    fn turn(&self) -> PlayerColor;
    fn legal_sans(&self) -> Vec<String>;
    fn is_check(&self) -> bool;
    fn is_checkmate(&self) -> bool;
    fn is_draw(&self) -> bool;
    fn is_game_over(&self) -> bool;
    fn history(&self) -> &[String];
    fn fen(&self) -> String;
    fn reset(&mut self);
}

/// Standard chess game over `shakmaty`, with undo and SAN history.
#[derive(Debug, Clone, Default)]
pub struct ShakmatyGame {
    pos: Chess,
    previous: Vec<Chess>,
    history: Vec<String>,
}

impl ShakmatyGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> &Chess {
        &self.pos
    }

    fn apply(&mut self, mv: shakmaty::Move) -> MoveResult {
        let san = San::from_move(&self.pos, mv.clone()).to_string();
        self.previous.push(self.pos.clone());
        self.pos.play_unchecked(mv);
        self.history.push(san.clone());
        MoveResult::Accepted {
            san,
            history: self.history.clone(),
        }
    }

    fn resolve_san(&self, san: &str) -> Option<shakmaty::Move> {
        let parsed: San = normalize_san(san).parse().ok()?;
        parsed.to_move(&self.pos).ok()
    }

    fn is_threefold_repetition(&self) -> bool {
        let current = repetition_key(&self.pos);
        let seen = self
            .previous
            .iter()
            .filter(|pos| repetition_key(pos) == current)
            .count();
        seen >= 2
    }
}

/// First four FEN fields: placement, side to move, castling, en passant.
fn repetition_key(pos: &Chess) -> String {
    let fen = Fen::from_position(pos, EnPassantMode::Legal).to_string();
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

impl LegalMoves for ShakmatyGame {
    fn is_legal_san(&self, san: &str) -> bool {
        self.resolve_san(san).is_some()
    }
}

impl RulesEngine for ShakmatyGame {
    fn try_move(&mut self, from: Square, to: Square, promotion: Option<Role>) -> MoveResult {
        let uci = UciMove::Normal { from, to, promotion };
        match uci.to_move(&self.pos) {
            Ok(mv) => self.apply(mv),
            Err(_) => {
                // Drops onto the back rank without a piece choice
                if promotion.is_none() {
                    let promoted = UciMove::Normal { from, to, promotion: Some(Role::Queen) };
                    if let Ok(mv) = promoted.to_move(&self.pos) {
                        return self.apply(mv);
                    }
                }
                MoveResult::Rejected
            }
        }
    }

    fn play_san(&mut self, san: &str) -> MoveResult {
        match self.resolve_san(san) {
            Some(mv) => self.apply(mv),
            None => MoveResult::Rejected,
        }
    }

    fn undo(&mut self) -> bool {
        match self.previous.pop() {
            Some(pos) => {
                self.pos = pos;
                self.history.pop();
                true
            }
            None => false,
        }
    }

    fn turn(&self) -> PlayerColor {
        self.pos.turn().into()
    }

    fn legal_sans(&self) -> Vec<String> {
        self.pos
            .legal_moves()
            .iter()
            .map(|mv| San::from_move(&self.pos, mv.clone()).to_string())
            .collect()
    }

    fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }

    fn is_draw(&self) -> bool {
        self.pos.is_stalemate()
            || self.pos.is_insufficient_material()
            || self.pos.halfmoves() >= 100
            || self.is_threefold_repetition()
    }

    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    fn history(&self) -> &[String] {
        &self.history
    }

    fn fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
