//! Opening book lookups.
//!
//! All lookups are pure functions of the entry and the SAN history. When the
//! history leaves the book's coverage the book stops constraining play.

use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::entry::{normalize_san, position_key, OpeningEntry, OpeningLine, OpeningSummary, PlayerColor, PositionKey};
use crate::error::BookError;
use crate::rules::LegalMoves;
use crate::session::PracticeSession;

/// An ordered catalog of openings.
#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    entries: Vec<Arc<OpeningEntry>>,
    index: HashMap<String, usize>,
}

impl OpeningBook {
    /// Build a book. On duplicate keys the first registration wins.
    pub fn new(entries: Vec<OpeningEntry>) -> Self {
        let mut book = Self::default();
        for entry in entries {
            if book.index.contains_key(&entry.key) {
                tracing::warn!(key = %entry.key, "Duplicate opening key ignored");
                continue;
            }
            book.index.insert(entry.key.clone(), book.entries.len());
            book.entries.push(Arc::new(entry));
        }
        book
    }

    /// The compiled-in catalog.
    pub fn builtin() -> &'static OpeningBook {
        &crate::catalog::BUILTIN
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Arc<OpeningEntry>> {
        self.entries.iter()
    }

    /// Positions with book guidance, summed over all openings.
    pub fn total_positions(&self) -> usize {
        self.entries.iter().map(|e| e.line.positions()).sum()
    }

    /// All openings in registration order.
    pub fn list_openings(&self) -> Vec<OpeningSummary> {
        self.entries
            .iter()
            .map(|e| OpeningSummary {
                key: e.key.clone(),
                name: e.name.clone(),
                player_color: e.player_color,
            })
            .collect()
    }

    pub fn select_opening(&self, key: &str) -> Result<Arc<OpeningEntry>, BookError> {
        self.index
            .get(key)
            .map(|&i| Arc::clone(&self.entries[i]))
            .ok_or_else(|| BookError::NotFound(key.to_string()))
    }

    /// Select an opening and start a fresh session superseding `previous`.
    /// `player_color` overrides the entry's default side.
    pub fn start_session(
        &self,
        key: &str,
        player_color: Option<PlayerColor>,
        previous: &PracticeSession,
    ) -> Result<PracticeSession, BookError> {
        let entry = self.select_opening(key)?;
        let color = player_color.unwrap_or(entry.player_color);
        tracing::info!(opening = %entry.key, color = %color, "Starting practice session");
        Ok(PracticeSession::start(entry, color, previous))
    }
}

/// Whether `candidate` may be played after `history_before`.
pub fn is_move_allowed<S: AsRef<str>>(entry: &OpeningEntry, history_before: &[S], candidate: &str) -> bool {
    let candidate = normalize_san(candidate);
    match &entry.line {
        OpeningLine::Sequence(moves) => match moves.get(history_before.len()) {
            Some(expected) => normalize_san(expected) == candidate,
            None => true,
        },
        OpeningLine::Tree(tree) => match tree.get(&position_key(history_before)) {
            Some(allowed) => allowed.iter().any(|m| normalize_san(m) == candidate),
            None => true,
        },
    }
}

/// Book moves at `history`, unfiltered. Empty once out of book.
pub fn expected_moves<S: AsRef<str>>(entry: &OpeningEntry, history: &[S]) -> Vec<String> {
    match &entry.line {
        OpeningLine::Sequence(moves) => moves.get(history.len()).cloned().into_iter().collect(),
        OpeningLine::Tree(tree) => tree.get(&position_key(history)).cloned().unwrap_or_default(),
    }
}

/// Whether the book still has guidance at `history`.
pub fn in_book<S: AsRef<str>>(entry: &OpeningEntry, history: &[S]) -> bool {
    match &entry.line {
        OpeningLine::Sequence(moves) => history.len() < moves.len(),
        OpeningLine::Tree(tree) => tree.contains_key(&position_key(history)),
    }
}

/// Moves the automated opponent may answer with after `history_after`.
///
/// Tree candidates are filtered through the live position, so a table entry
/// that is illegal there is skipped rather than played.
pub fn next_opponent_moves<S: AsRef<str>, L: LegalMoves + ?Sized>(
    entry: &OpeningEntry,
    history_after: &[S],
    legal: &L,
) -> Vec<String> {
    match &entry.line {
        OpeningLine::Sequence(_) => expected_moves(entry, history_after),
        OpeningLine::Tree(_) => {
            let mut seen = HashSet::new();
            expected_moves(entry, history_after)
                .into_iter()
                .filter(|m| legal.is_legal_san(m))
                .filter(|m| seen.insert(normalize_san(m).to_string()))
                .collect()
        }
    }
}

/// Pick the opponent's reply. A single candidate is returned without drawing
/// from `rng`; otherwise the choice is uniform.
pub fn choose_opponent_move<R: Rng + ?Sized>(candidates: &[String], rng: &mut R) -> Option<String> {
    match candidates {
        [] => None,
        [only] => Some(only.clone()),
        _ => candidates.choose(rng).cloned(),
    }
}

/// Tree keys that cannot be reached from the start position by following the
/// tree's own branches. Sequences never have any.
pub fn unreachable_keys(entry: &OpeningEntry) -> Vec<PositionKey> {
    let OpeningLine::Tree(tree) = &entry.line else {
        return Vec::new();
    };

    let mut reached: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::from([String::new()]);
    while let Some(key) = queue.pop_front() {
        let Some((stored, moves)) = tree.get_key_value(&key) else {
            continue;
        };
        if !reached.insert(stored.as_str()) {
            continue;
        }
        for mv in moves {
            let child = if key.is_empty() { mv.clone() } else { format!("{key} {mv}") };
            queue.push_back(child);
        }
    }

    let mut orphans: Vec<PositionKey> = tree
        .keys()
        .filter(|k| !reached.contains(k.as_str()))
        .cloned()
        .collect();
    orphans.sort();
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct AnyLegal;

    impl LegalMoves for AnyLegal {
        fn is_legal_san(&self, _san: &str) -> bool {
            true
        }
    }

    struct Only(&'static [&'static str]);

    impl LegalMoves for Only {
        fn is_legal_san(&self, san: &str) -> bool {
            self.0.iter().any(|m| *m == san)
        }
    }

    fn ruy() -> OpeningEntry {
        OpeningEntry::sequence("ruy", "Ruy Lopez", PlayerColor::White, &["e4", "e5", "Nf3", "Nc6", "Bb5"])
    }

    fn small_tree() -> OpeningEntry {
        OpeningEntry::tree(
            "t",
            "Tree",
            PlayerColor::Black,
            &[("", "e4 d4"), ("e4", "c5"), ("d4", "Nf6"), ("e4 c5 Nf3", "d6")],
        )
    }

    #[test]
    fn test_sequence_allowed() {
        let entry = ruy();
        let empty: [&str; 0] = [];
        assert!(is_move_allowed(&entry, &empty, "e4"));
        assert!(!is_move_allowed(&entry, &empty, "Nf3"));
        assert!(is_move_allowed(&entry, &["e4", "e5", "Nf3", "Nc6"], "Bb5+"));
    }

    #[test]
    fn test_sequence_exhausted_is_unconstrained() {
        let entry = ruy();
        let history = ["e4", "e5", "Nf3", "Nc6", "Bb5"];
        assert!(is_move_allowed(&entry, &history, "a6"));
        assert!(is_move_allowed(&entry, &history, "Nf6"));
        assert!(next_opponent_moves(&entry, &history, &AnyLegal).is_empty());
        assert!(!in_book(&entry, &history));
    }

    #[test]
    fn test_tree_lookup() {
        let entry = small_tree();
        assert!(is_move_allowed(&entry, &["e4"], "c5"));
        assert!(!is_move_allowed(&entry, &["e4"], "e5"));
        // Unknown key: book has no guidance
        assert!(is_move_allowed(&entry, &["e4", "c5"], "Nc3"));
    }

    #[test]
    fn test_tree_opponent_moves_filtered_by_legality() {
        let entry = small_tree();
        let empty: [&str; 0] = [];
        assert_eq!(next_opponent_moves(&entry, &empty, &AnyLegal), vec!["e4", "d4"]);
        assert_eq!(next_opponent_moves(&entry, &empty, &Only(&["d4"])), vec!["d4"]);
        assert!(next_opponent_moves(&entry, &empty, &Only(&[])).is_empty());
        assert!(next_opponent_moves(&entry, &["c4"], &AnyLegal).is_empty());
    }

    #[test]
    fn test_choose_sole_candidate_does_not_need_rng() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(choose_opponent_move(&["Nf3".to_string()], &mut rng), Some("Nf3".to_string()));
        assert_eq!(choose_opponent_move(&[], &mut rng), None);
    }

    #[test]
    fn test_choose_seeded_is_deterministic() {
        let candidates: Vec<String> = ["d6", "Nc6", "e6"].iter().map(|s| s.to_string()).collect();
        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..16)
                .map(|_| choose_opponent_move(&candidates, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        let first = picks(42);
        assert_eq!(first, picks(42));
        assert!(first.iter().all(|m| candidates.contains(m)));
    }

    #[test]
    fn test_unreachable_keys() {
        assert_eq!(unreachable_keys(&small_tree()), vec!["e4 c5 Nf3".to_string()]);
        assert!(unreachable_keys(&ruy()).is_empty());
    }

    #[test]
    fn test_select_opening() {
        let book = OpeningBook::new(vec![ruy(), small_tree(), ruy()]);
        assert_eq!(book.len(), 2);
        assert_eq!(book.select_opening("t").unwrap().name, "Tree");
        assert_eq!(book.select_opening("caro"), Err(BookError::NotFound("caro".to_string())));
        let keys: Vec<String> = book.list_openings().into_iter().map(|o| o.key).collect();
        assert_eq!(keys, vec!["ruy", "t"]);
    }
}
