use thiserror::Error;

pub type ZaplineResult<T> = Result<T, ZaplineError>;

#[derive(Error, Debug)]
pub enum ZaplineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Campaign {0} not found")]
    CampaignNotFound(uuid::Uuid),

    #[error("Contact {0} not found")]
    ContactNotFound(uuid::Uuid),

    #[error("Invalid submission: {0}")]
    Submission(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
