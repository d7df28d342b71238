//! Text rendering of the book around the current position.

use opening_book::{position_key, OpeningEntry, OpeningLine};
use std::collections::HashMap;

/// Plies of tree continuation shown below the current position.
const TREE_DEPTH: usize = 4;

pub fn render<S: AsRef<str>>(entry: &OpeningEntry, history: &[S]) -> String {
    match &entry.line {
        OpeningLine::Sequence(moves) => render_sequence(moves, history.len()),
        OpeningLine::Tree(tree) => {
            let key = position_key(history);
            let mut out = String::new();
            render_branches(tree, &key, 0, &mut out);
            if out.is_empty() {
                "(out of book)".to_string()
            } else {
                out.trim_end().to_string()
            }
        }
    }
}

/// The line with move numbers and the next expected move in brackets.
fn render_sequence(moves: &[String], next: usize) -> String {
    let mut parts = Vec::with_capacity(moves.len());
    for (ply, mv) in moves.iter().enumerate() {
        let mut part = String::new();
        if ply % 2 == 0 {
            part.push_str(&format!("{}. ", ply / 2 + 1));
        }
        if ply == next {
            part.push_str(&format!("[{mv}]"));
        } else {
            part.push_str(mv);
        }
        parts.push(part);
    }
    let mut line = parts.join(" ");
    if next >= moves.len() {
        line.push_str(" (out of book)");
    }
    line
}

fn render_branches(tree: &HashMap<String, Vec<String>>, key: &str, depth: usize, out: &mut String) {
    if depth >= TREE_DEPTH {
        return;
    }
    let Some(moves) = tree.get(key) else {
        return;
    };
    for mv in moves {
        out.push_str(&"  ".repeat(depth));
        out.push_str(mv);
        out.push('\n');
        let child = if key.is_empty() { mv.clone() } else { format!("{key} {mv}") };
        render_branches(tree, &child, depth + 1, out);
    }
}
