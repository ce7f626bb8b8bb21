use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SharpError {
    #[error("Prediction not found: {id}")]
    PredictionNotFound { id: Uuid },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Unknown sport: {0}")]
    UnknownSport(String),

    #[error("Incomplete weight set, missing: {missing}")]
    IncompleteWeights { missing: String },

    #[error("Schedule provider error: {0}")]
    Schedule(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, SharpError>;
