use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Can't auth: {0}")]
    Auth(#[source] RedditApiError),

    #[error("Comment stream failed: {0}")]
    Stream(#[source] RedditApiError),

    #[error("Comment stream ended unexpectedly")]
    StreamEnded,

    #[error("Failed to deliver message to {recipient}: {source}")]
    Delivery {
        recipient: String,
        #[source]
        source: RedditApiError,
    },
}

#[derive(Error, Debug)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Subreddit not found: {subreddit}")]
    SubredditNotFound { subreddit: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },

    #[error("Message rejected: {reason}")]
    MessageRejected { reason: String },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Network error: {details}")]
    Network { details: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Can't open file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Impossible to parse file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{violation} in file '{}'", .path.display())]
    Schema {
        path: PathBuf,
        violation: SchemaViolation,
    },
}

/// What exactly was wrong with a syntactically valid configuration document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("Incorrect root element")]
    RootNotMapping,

    #[error("Missing argument '{field}'")]
    MissingField { field: String },

    #[error("Incorrect argument '{field}': expected {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("Empty argument '{field}'")]
    EmptyValue { field: String },

    #[error("Incorrect value number '{index}' for property '{field}': {reason}")]
    InvalidEntry {
        field: String,
        index: usize,
        reason: String,
    },
}

impl ConfigError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ConfigError::Io { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Schema { path, .. } => path,
        }
    }
}
