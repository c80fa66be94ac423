/// Shared error type used across all Someleon crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    /// The agent runtime could not be built or refused a task.
    #[error("agent runtime: {0}")]
    Runtime(String),

    #[error("Unknown sessionId: {0}")]
    NotFound(String),

    /// A required request field was missing or blank.
    #[error("missing {field}")]
    Validation { field: String },

    /// Another run currently owns the session.
    #[error("session {0} is busy: a run is already in progress")]
    Busy(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn missing(field: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
