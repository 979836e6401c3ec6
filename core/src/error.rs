use thiserror::Error;

#[derive(Error, Debug)]
pub enum PetError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Hub returned {status}: {message}")]
    Hub { status: u16, message: String },

    #[error("Hub is not reachable in this session")]
    HubUnavailable,

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PetResult<T> = Result<T, PetError>;
