//! Practice session state.
//!
//! A session is a value: every transition returns a new `PracticeSession`
//! and the host replaces its copy. Each selection or reset gets a new
//! `SessionToken`, which is how replies scheduled for an older session are
//! recognized and dropped.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::book::{self, choose_opponent_move, next_opponent_moves};
use crate::entry::{OpeningEntry, PlayerColor};
use crate::rules::LegalMoves;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionToken(u64);

impl SessionToken {
    pub fn next(self) -> Self {
        SessionToken(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No opening selected; every legal move is accepted.
    Idle,
    InBook,
    /// Play has left the book. Terminal until the next selection or reset.
    FreePlay,
}

/// The opponent's reply, to be applied after `delay` if `token` is still
/// current and the game is still `ply` half-moves long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledReply {
    pub san: String,
    pub token: SessionToken,
    pub ply: usize,
    pub delay: Duration,
}

/// Result of checking a trainee move against the book.
#[derive(Debug, Clone)]
pub enum MoveVerdict {
    Allowed(PracticeSession),
    Deviation { expected: Vec<String>, played: String },
}

#[derive(Debug, Clone)]
pub struct PracticeSession {
    token: SessionToken,
    opening: Option<Arc<OpeningEntry>>,
    player_color: PlayerColor,
    cursor: usize,
    phase: SessionPhase,
}

impl Default for PracticeSession {
    fn default() -> Self {
        Self::idle()
    }
}

impl PracticeSession {
    pub fn idle() -> Self {
        Self {
            token: SessionToken::default(),
            opening: None,
            player_color: PlayerColor::White,
            cursor: 0,
            phase: SessionPhase::Idle,
        }
    }

    pub(crate) fn start(entry: Arc<OpeningEntry>, player_color: PlayerColor, previous: &PracticeSession) -> Self {
        Self {
            token: previous.token.next(),
            opening: Some(entry),
            player_color,
            cursor: 0,
            phase: SessionPhase::InBook,
        }
    }

    /// Drop the opening and invalidate anything scheduled for this session.
    pub fn reset(&self) -> Self {
        Self {
            token: self.token.next(),
            player_color: self.player_color,
            ..Self::idle()
        }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn opening(&self) -> Option<&Arc<OpeningEntry>> {
        self.opening.as_ref()
    }

    pub fn player_color(&self) -> PlayerColor {
        self.player_color
    }

    /// Plies played while the session was in book.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_current(&self, token: SessionToken) -> bool {
        self.token == token
    }

    /// Whether `reply` was scheduled for this session at a game of `plies`
    /// half-moves.
    pub fn accepts_reply(&self, reply: &ScheduledReply, plies: usize) -> bool {
        self.is_current(reply.token) && reply.ply == plies
    }

    /// Stop following the book, e.g. when a book reply cannot be played.
    pub fn leave_book(&self) -> Self {
        match self.phase {
            SessionPhase::InBook => Self {
                opening: self.opening.clone(),
                phase: SessionPhase::FreePlay,
                ..*self
            },
            _ => self.clone(),
        }
    }

    /// The trainee plays black and the opponent has yet to open.
    pub fn awaiting_opening_move(&self) -> bool {
        self.phase == SessionPhase::InBook
            && self.cursor == 0
            && self.player_color == PlayerColor::Black
    }

    fn advanced<S: AsRef<str>>(&self, history: &[S]) -> Self {
        let phase = match &self.opening {
            Some(entry) if book::in_book(entry, history) => SessionPhase::InBook,
            _ => SessionPhase::FreePlay,
        };
        if phase == SessionPhase::FreePlay {
            tracing::debug!(token = self.token.value(), plies = history.len(), "Left the book");
        }
        Self {
            opening: self.opening.clone(),
            cursor: history.len(),
            phase,
            ..*self
        }
    }

    pub fn check_player_move<S: AsRef<str>>(&self, history_before: &[S], san: &str) -> MoveVerdict {
        let entry = match (&self.phase, &self.opening) {
            (SessionPhase::InBook, Some(entry)) => entry,
            _ => return MoveVerdict::Allowed(self.clone()),
        };

        if !book::is_move_allowed(entry, history_before, san) {
            return MoveVerdict::Deviation {
                expected: book::expected_moves(entry, history_before),
                played: san.to_string(),
            };
        }

        let mut history: Vec<&str> = history_before.iter().map(|s| s.as_ref()).collect();
        history.push(san);
        MoveVerdict::Allowed(self.advanced(history.as_slice()))
    }

    /// Account for an automated reply that has been applied.
    pub fn record_opponent_move<S: AsRef<str>>(&self, history_after: &[S]) -> Self {
        match self.phase {
            SessionPhase::InBook => self.advanced(history_after),
            _ => self.clone(),
        }
    }

    /// The reply to schedule after `history_after`, if the opponent is to
    /// move and the book has a legal candidate.
    pub fn opponent_reply<S, L, R>(
        &self,
        history_after: &[S],
        legal: &L,
        rng: &mut R,
        delay: Duration,
    ) -> Option<ScheduledReply>
    where
        S: AsRef<str>,
        L: LegalMoves + ?Sized,
        R: Rng + ?Sized,
    {
        if self.phase != SessionPhase::InBook {
            return None;
        }
        if PlayerColor::to_move_after(history_after.len()) == self.player_color {
            return None;
        }
        let entry = self.opening.as_ref()?;
        let candidates = next_opponent_moves(entry, history_after, legal);
        let san = choose_opponent_move(&candidates, rng)?;
        Some(ScheduledReply {
            san,
            token: self.token,
            ply: history_after.len(),
            delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::OpeningBook;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct AnyLegal;

    impl LegalMoves for AnyLegal {
        fn is_legal_san(&self, _san: &str) -> bool {
            true
        }
    }

    fn book() -> OpeningBook {
        OpeningBook::new(vec![
            OpeningEntry::sequence("ruy", "Ruy Lopez", PlayerColor::White, &["e4", "e5", "Nf3", "Nc6", "Bb5"]),
            OpeningEntry::sequence("french", "French Defense", PlayerColor::Black, &["e4", "e6", "d4", "d5"]),
        ])
    }

    #[test]
    fn test_tokens_advance_on_select_and_reset() {
        let book = book();
        let idle = PracticeSession::idle();
        let first = book.start_session("ruy", None, &idle).unwrap();
        let second = book.start_session("ruy", None, &first).unwrap();
        let reset = second.reset();

        assert_ne!(first.token(), second.token());
        assert!(!second.is_current(first.token()));
        assert_eq!(reset.phase(), SessionPhase::Idle);
        assert!(reset.opening().is_none());
        assert!(reset.token() > second.token());
    }

    #[test]
    fn test_idle_allows_anything() {
        let empty: [&str; 0] = [];
        match PracticeSession::idle().check_player_move(&empty, "h4") {
            MoveVerdict::Allowed(s) => assert_eq!(s.phase(), SessionPhase::Idle),
            MoveVerdict::Deviation { .. } => panic!("idle session rejected a move"),
        }
    }

    #[test]
    fn test_white_line_until_free_play() {
        let book = book();
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = book.start_session("ruy", None, &PracticeSession::idle()).unwrap();
        let delay = Duration::from_millis(450);
        let empty: [&str; 0] = [];

        assert!(session.opponent_reply(&empty, &AnyLegal, &mut rng, delay).is_none());

        match session.check_player_move(&empty, "Nf3") {
            MoveVerdict::Deviation { expected, played } => {
                assert_eq!(expected, vec!["e4"]);
                assert_eq!(played, "Nf3");
            }
            MoveVerdict::Allowed(_) => panic!("deviation accepted"),
        }

        session = match session.check_player_move(&empty, "e4") {
            MoveVerdict::Allowed(s) => s,
            MoveVerdict::Deviation { .. } => panic!("book move rejected"),
        };
        assert_eq!(session.cursor(), 1);

        let reply = session.opponent_reply(&["e4"], &AnyLegal, &mut rng, delay).unwrap();
        assert_eq!(reply.san, "e5");
        assert_eq!(reply.token, session.token());
        session = session.record_opponent_move(&["e4", "e5"]);
        assert_eq!(session.cursor(), 2);

        let history = ["e4", "e5", "Nf3", "Nc6"];
        session = match session.check_player_move(&history, "Bb5") {
            MoveVerdict::Allowed(s) => s,
            MoveVerdict::Deviation { .. } => panic!("book move rejected"),
        };
        assert_eq!(session.phase(), SessionPhase::FreePlay);
        assert!(matches!(
            session.check_player_move(&["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"], "Qe2"),
            MoveVerdict::Allowed(_)
        ));
    }

    #[test]
    fn test_black_trainee_waits_for_opening_move() {
        let book = book();
        let mut rng = StdRng::seed_from_u64(1);
        let session = book.start_session("french", None, &PracticeSession::idle()).unwrap();
        assert!(session.awaiting_opening_move());

        let empty: [&str; 0] = [];
        let reply = session
            .opponent_reply(&empty, &AnyLegal, &mut rng, Duration::from_millis(700))
            .unwrap();
        assert_eq!(reply.san, "e4");
        assert_eq!(reply.ply, 0);
        assert_eq!(reply.delay, Duration::from_millis(700));
        assert!(session.accepts_reply(&reply, 0));
        assert!(!session.accepts_reply(&reply, 2));
        assert!(!session.reset().accepts_reply(&reply, 0));
        assert!(!session.record_opponent_move(&["e4"]).awaiting_opening_move());
    }

    #[test]
    fn test_leave_book() {
        let book = book();
        let session = book.start_session("ruy", None, &PracticeSession::idle()).unwrap();
        let left = session.leave_book();
        assert_eq!(left.phase(), SessionPhase::FreePlay);
        assert_eq!(left.token(), session.token());
        assert_eq!(PracticeSession::idle().leave_book().phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_color_override() {
        let book = book();
        let session = book
            .start_session("ruy", Some(PlayerColor::Black), &PracticeSession::idle())
            .unwrap();
        assert_eq!(session.player_color(), PlayerColor::Black);
        assert!(session.awaiting_opening_move());
    }
}
