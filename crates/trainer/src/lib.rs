pub mod app;
pub mod board;
pub mod book_view;
pub mod command;
pub mod config;
pub mod error;
pub mod trainer;

pub use error::TrainerError;
pub use trainer::{DropOutcome, ReplyOutcome, Response, Selection, Snapback, Trainer};
