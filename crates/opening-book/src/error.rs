//! Opening book error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Opening not found: {0}")]
    NotFound(String),

    #[error("Unknown color '{0}'")]
    InvalidColor(String),
}
