use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OpscopeError {
    #[error("not initialized: run 'opscope init'")]
    NotInitialized,

    #[error("action not found: {0}")]
    ActionNotFound(Uuid),

    #[error("action already completed: {0}")]
    ActionAlreadyCompleted(Uuid),

    #[error("invalid terminal status '{0}': must be completed or failed")]
    NonTerminalStatus(String),

    #[error("completion time {completed_at} precedes creation time {created_at} for action {id}")]
    CompletionBeforeCreation {
        id: Uuid,
        created_at: i64,
        completed_at: i64,
    },

    #[error("invalid timestamp '{0}': expected RFC 3339")]
    InvalidTimestamp(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OpscopeError>;
