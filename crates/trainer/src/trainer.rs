//! Practice board: the rules engine, the board view and the opening session
//! wired together the way the page's event handlers were.

use rand::rngs::StdRng;
use rand::SeedableRng;
use shakmaty::{Position, Role, Square};
use std::fmt;
use std::time::Duration;

use opening_book::{
    MoveResult, MoveVerdict, OpeningBook, PlayerColor, PracticeSession, RulesEngine,
    ScheduledReply, ShakmatyGame,
};

use crate::board::BoardView;
use crate::book_view;
use crate::command::{Command, HELP};
use crate::config::Config;
use crate::error::TrainerError;

/// Why a dropped piece went back to its square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapback {
    NotYourPiece,
    GameOver,
    Illegal,
    Deviation { expected: Vec<String>, played: String },
}

impl fmt::Display for Snapback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Snapback::NotYourPiece => f.write_str("That is not your piece"),
            Snapback::GameOver => f.write_str("The game is over"),
            Snapback::Illegal => f.write_str("Illegal move"),
            Snapback::Deviation { expected, played } => {
                write!(f, "Expected {}, not {played}", expected.join(" or "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Accepted {
        san: String,
        reply: Option<ScheduledReply>,
    },
    Snapback(Snapback),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Applied(String),
    /// Scheduled for a session that has since been reset or replaced.
    Stale,
    /// The rules engine refused the book move.
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub player_color: PlayerColor,
    pub reply: Option<ScheduledReply>,
}

/// What the host should do after a command.
#[derive(Debug, Default)]
pub struct Response {
    pub lines: Vec<String>,
    pub reply: Option<ScheduledReply>,
    pub quit: bool,
}

impl Response {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            ..Self::default()
        }
    }
}

pub struct Trainer {
    book: OpeningBook,
    game: ShakmatyGame,
    board: BoardView,
    session: PracticeSession,
    rng: StdRng,
    reply_delay: Duration,
    first_move_delay: Duration,
    show_tree: bool,
}

impl Trainer {
    pub fn new(book: OpeningBook, config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            book,
            game: ShakmatyGame::new(),
            board: BoardView::new(config.orientation),
            session: PracticeSession::idle(),
            rng,
            reply_delay: config.reply_delay,
            first_move_delay: config.first_move_delay,
            show_tree: false,
        }
    }

    pub fn book(&self) -> &OpeningBook {
        &self.book
    }

    pub fn game(&self) -> &ShakmatyGame {
        &self.game
    }

    pub fn session(&self) -> &PracticeSession {
        &self.session
    }

    pub fn orientation(&self) -> PlayerColor {
        self.board.orientation()
    }

    /// Start practicing `key` as the side at the bottom of the board.
    pub fn select_opening(&mut self, key: &str) -> Result<Selection, TrainerError> {
        let session = self
            .book
            .start_session(key, Some(self.board.orientation()), &self.session)?;
        self.game.reset();
        self.session = session;

        let name = self
            .session
            .opening()
            .map(|e| e.name.clone())
            .unwrap_or_default();
        tracing::info!("Practicing {} as {}", name, self.session.player_color());

        let reply = if self.session.awaiting_opening_move() {
            self.session.opponent_reply(
                self.game.history(),
                &self.game,
                &mut self.rng,
                self.first_move_delay,
            )
        } else {
            None
        };

        Ok(Selection {
            name,
            player_color: self.session.player_color(),
            reply,
        })
    }

    pub fn drop_piece(&mut self, from: Square, to: Square, promotion: Option<Role>) -> DropOutcome {
        let Some(piece) = self.game.position().board().piece_at(from) else {
            return DropOutcome::Snapback(Snapback::Illegal);
        };
        if self.game.is_game_over() {
            return DropOutcome::Snapback(Snapback::GameOver);
        }
        if !self.board.can_drag(piece.color.into(), false) {
            return DropOutcome::Snapback(Snapback::NotYourPiece);
        }

        let history_before = self.game.history().to_vec();
        let (san, history) = match self.game.try_move(from, to, promotion) {
            MoveResult::Accepted { san, history } => (san, history),
            MoveResult::Rejected => return DropOutcome::Snapback(Snapback::Illegal),
        };

        match self.session.check_player_move(&history_before, &san) {
            MoveVerdict::Allowed(session) => {
                self.session = session;
                let reply = self.session.opponent_reply(
                    &history,
                    &self.game,
                    &mut self.rng,
                    self.reply_delay,
                );
                DropOutcome::Accepted { san, reply }
            }
            MoveVerdict::Deviation { expected, played } => {
                tracing::debug!(?expected, %played, "Move left the book");
                self.game.undo();
                DropOutcome::Snapback(Snapback::Deviation { expected, played })
            }
        }
    }

    /// Apply a delayed opponent reply if its session is still current and
    /// nothing has been played since it was scheduled.
    pub fn apply_reply(&mut self, reply: &ScheduledReply) -> ReplyOutcome {
        let plies = self.game.history().len();
        if !self.session.accepts_reply(reply, plies) {
            tracing::debug!(
                token = reply.token.value(),
                current = self.session.token().value(),
                ply = reply.ply,
                plies,
                "Dropping stale reply {}",
                reply.san
            );
            return ReplyOutcome::Stale;
        }
        match self.game.play_san(&reply.san) {
            MoveResult::Accepted { san, history } => {
                self.session = self.session.record_opponent_move(&history);
                ReplyOutcome::Applied(san)
            }
            MoveResult::Rejected => {
                tracing::warn!("Book reply {} is illegal here", reply.san);
                self.session = self.session.leave_book();
                ReplyOutcome::Rejected(reply.san.clone())
            }
        }
    }

    /// New game, practice mode off.
    pub fn reset(&mut self) {
        self.game.reset();
        self.session = self.session.reset();
    }

    pub fn flip(&mut self) {
        self.board.flip();
    }

    pub fn toggle_tree(&mut self) -> bool {
        self.show_tree = !self.show_tree;
        self.show_tree
    }

    pub fn status(&self) -> String {
        let mut status = if self.game.is_checkmate() {
            "Checkmate!".to_string()
        } else if self.game.is_draw() {
            "Draw!".to_string()
        } else {
            match self.game.turn() {
                PlayerColor::White => "White to move".to_string(),
                PlayerColor::Black => "Black to move".to_string(),
            }
        };
        if self.game.is_check() {
            status.push_str(" (Check!)");
        }
        format!("Status: {status}")
    }

    /// Book display for the current position, when enabled and practicing.
    pub fn book_view(&self) -> Option<String> {
        if !self.show_tree {
            return None;
        }
        let entry = self.session.opening()?;
        Some(book_view::render(entry, self.game.history()))
    }

    pub fn render(&self) -> String {
        let mut out = self.board.render(self.game.position().board());
        out.push('\n');
        out.push_str(&self.status());
        if let Some(view) = self.book_view() {
            out.push('\n');
            out.push_str(&view);
        }
        out
    }

    pub fn list_lines(&self) -> Vec<String> {
        self.book
            .list_openings()
            .into_iter()
            .map(|o| format!("{:<14} {} ({})", o.key, o.name, o.player_color))
            .collect()
    }

    pub fn execute(&mut self, command: Command) -> Result<Response, TrainerError> {
        let response = match command {
            Command::Drop { from, to, promotion } => match self.drop_piece(from, to, promotion) {
                DropOutcome::Accepted { san, reply } => Response {
                    lines: vec![format!("You played {san}"), self.render()],
                    reply,
                    quit: false,
                },
                DropOutcome::Snapback(reason) => Response::line(reason.to_string()),
            },
            Command::Open { key, color } => {
                if let Some(color) = color {
                    self.board.set_orientation(color);
                }
                let selection = self.select_opening(&key)?;
                Response {
                    lines: vec![format!("Practicing {}", selection.name), self.render()],
                    reply: selection.reply,
                    quit: false,
                }
            }
            Command::List => Response {
                lines: self.list_lines(),
                ..Response::default()
            },
            Command::Reset => {
                self.reset();
                Response::line(self.render())
            }
            Command::Flip => {
                self.flip();
                Response::line(self.render())
            }
            Command::Tree => {
                let shown = self.toggle_tree();
                Response::line(if shown { "Book display on" } else { "Book display off" })
            }
            Command::Board => Response::line(self.render()),
            Command::Help => Response::line(HELP),
            Command::Quit => Response {
                quit: true,
                ..Response::default()
            },
        };
        Ok(response)
    }

    /// Text to show once a reply has been handled.
    pub fn describe_reply(&self, outcome: &ReplyOutcome) -> Option<String> {
        match outcome {
            ReplyOutcome::Applied(san) => Some(format!("Opponent played {san}\n{}", self.render())),
            ReplyOutcome::Stale => None,
            ReplyOutcome::Rejected(san) => Some(format!("Book move {san} is not playable; free play")),
        }
    }
}
