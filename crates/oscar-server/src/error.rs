//! Server error types

use oscar_core::Message;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("listener cancelled")]
    Cancelled,

    #[error("transport error: {0}")]
    Transport(#[from] oscar_transport::TransportError),

    #[error("invalid address pattern: {0}")]
    Pattern(#[from] oscar_core::Error),

    #[error("no handler matched {0}")]
    UnmatchedPattern(Message),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("task failed: {0}")]
    Task(String),
}
