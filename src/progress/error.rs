use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the progress tracker and its store boundary
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Customer not found: {0}")]
    NotFound(Uuid),

    #[error("Unknown stage key: {0}")]
    InvalidStage(String),

    #[error("Invalid payload for stage '{stage}': {message}")]
    InvalidPayload { stage: &'static str, message: String },

    #[error("Unknown achievement flag: {0}")]
    InvalidAchievement(String),

    #[error("Achievement level {0} is out of range 1..=3")]
    InvalidLevel(u8),

    #[error("Round {round} is out of range 1..={max}")]
    RoundOutOfRange { round: usize, max: usize },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ProgressError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        ProgressError::Storage(err.to_string())
    }
}
