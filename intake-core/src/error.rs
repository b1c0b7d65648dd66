use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Reply channel error: {0}")]
    Channel(String),

    #[error("Order sink error: {0}")]
    Sink(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Empty content")]
    EmptyContent,
}

pub type Result<T> = std::result::Result<T, IntakeError>;
