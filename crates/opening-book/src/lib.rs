//! Opening trainer core: the opening catalog, book lookups and practice
//! sessions, with the rules engine behind a trait.

pub mod book;
pub mod catalog;
pub mod entry;
pub mod error;
pub mod rules;
pub mod session;

pub use book::{
    choose_opponent_move, expected_moves, in_book, is_move_allowed, next_opponent_moves,
    unreachable_keys, OpeningBook,
};
pub use entry::{position_key, OpeningEntry, OpeningLine, OpeningSummary, PlayerColor, PositionKey};
pub use error::BookError;
pub use rules::{LegalMoves, MoveResult, RulesEngine, ShakmatyGame};
pub use session::{MoveVerdict, PracticeSession, ScheduledReply, SessionPhase, SessionToken};
