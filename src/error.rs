//! Error types for the adventure client.

use thiserror::Error;

use crate::model::phase::GamePhase;

/// The narrative backend call failed. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Network failure before a response arrived.
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The payload was not valid JSON.
    #[error("unparseable response: {0}")]
    Parse(String),

    /// The payload was JSON but did not match the narrative schema.
    #[error("response violated schema: {0}")]
    Schema(String),

    #[error("no API key configured")]
    MissingApiKey,

    #[error("service returned an empty completion")]
    EmptyCompletion,
}

/// A caller asked for something the session cannot do right now.
/// Rejected synchronously; nothing is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("character name must not be empty")]
    EmptyName,

    #[error("action must not be empty")]
    EmptyAction,

    #[error("cannot start a session while {0}")]
    AlreadyStarted(GamePhase),

    #[error("cannot act while {0}")]
    NotPlaying(GamePhase),

    #[error("choice {index} is out of range ({len} available)")]
    ChoiceOutOfRange { index: usize, len: usize },

    /// A response arrived for a request that is no longer outstanding.
    #[error("response does not match the outstanding request")]
    StaleTicket,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
