use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetroError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Session closed for board {0}")]
    SessionClosed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
