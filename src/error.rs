// Typed errors with thiserror. Surface meaningful messages to JS.
// The accumulation rule itself never errors; these cover the boundaries around it.

use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    #[error("Persistence error for user {user_id}, video {video_id}: {message}")]
    Persistence {
        user_id: String,
        video_id: String,
        message: String,
    },

    #[error("Metadata lookup failed: {0}")]
    Metadata(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}
