//! Terminal board view.

use opening_book::PlayerColor;
use shakmaty::{Board, File, Rank, Square};

#[derive(Debug, Clone)]
pub struct BoardView {
    orientation: PlayerColor,
}

impl BoardView {
    pub fn new(orientation: PlayerColor) -> Self {
        Self { orientation }
    }

    /// The side shown at the bottom, which is the side the trainee moves.
    pub fn orientation(&self) -> PlayerColor {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: PlayerColor) {
        self.orientation = orientation;
    }

    pub fn flip(&mut self) {
        self.orientation = self.orientation.opponent();
    }

    /// Drag-start gate: only the bottom side's pieces move, and nothing moves
    /// once the game is over.
    pub fn can_drag(&self, piece_color: PlayerColor, game_over: bool) -> bool {
        !game_over && piece_color == self.orientation
    }

    pub fn render(&self, board: &Board) -> String {
        let (ranks, files): (Vec<u32>, Vec<u32>) = match self.orientation {
            PlayerColor::White => ((0..8).rev().collect(), (0..8).collect()),
            PlayerColor::Black => ((0..8).collect(), (0..8).rev().collect()),
        };

        let mut out = String::new();
        for &rank in &ranks {
            out.push_str(&format!("{} ", rank + 1));
            for &file in &files {
                let sq = Square::from_coords(File::new(file), Rank::new(rank));
                let c = board.piece_at(sq).map(|p| p.char()).unwrap_or('.');
                out.push(' ');
                out.push(c);
            }
            out.push('\n');
        }
        out.push_str("  ");
        for &file in &files {
            out.push(' ');
            out.push((b'a' + file as u8) as char);
        }
        out
    }
}
