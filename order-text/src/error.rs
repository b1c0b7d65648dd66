use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum OrderTextError {
    #[error("Grams must be a positive number, got {0}")]
    InvalidGrams(f64),
    #[error("Invalid cost option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, OrderTextError>;
