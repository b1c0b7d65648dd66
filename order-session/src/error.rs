//! Session error types.

use thiserror::Error;

/// Errors from explicit session operations. Message handling never returns these to the user.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No live session for chat: {0}")]
    NotFound(String),
    #[error("Session store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
