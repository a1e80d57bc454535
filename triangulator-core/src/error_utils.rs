use crate::error::*;
use tracing::{error, warn};

pub trait ErrorExt {
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Auth(e) => format!("Reddit login failed. {}", e.user_friendly_message()),
            CoreError::Stream(e) => format!(
                "Lost the subreddit comment stream. {}",
                e.user_friendly_message()
            ),
            CoreError::StreamEnded => {
                "The subreddit comment stream stopped producing comments.".to_string()
            }
            CoreError::Delivery { recipient, source } => format!(
                "Could not send the detection message to u/{}. {}",
                recipient,
                source.user_friendly_message()
            ),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Config(e) => e.error_code(),
            CoreError::Auth(_) => "AUTH".to_string(),
            CoreError::Stream(_) => "STREAM".to_string(),
            CoreError::StreamEnded => "STREAM_ENDED".to_string(),
            CoreError::Delivery { .. } => "DELIVERY".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_warn(&self) -> &Self {
        warn!("RedditApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit authentication failed. Please check your credentials.".to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Reddit asked to wait {} seconds.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. The account may not have permission to view this content.",
                resource
            ),
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("Subreddit '{}' not found or is private.", subreddit)
            }
            RedditApiError::InvalidToken => {
                "Reddit authentication token is invalid. Please re-authenticate.".to_string()
            }
            RedditApiError::RequestTimeout => "Request to Reddit timed out.".to_string(),
            RedditApiError::MessageRejected { reason } => {
                format!("Reddit rejected the private message: {}", reason)
            }
            RedditApiError::NotAuthenticated => {
                "The Reddit client was used before logging in.".to_string()
            }
            RedditApiError::Network { .. } => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            _ => "Reddit API error occurred.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidRequest { .. } => "REDDIT_INVALID_REQUEST".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
            RedditApiError::MessageRejected { .. } => "REDDIT_MESSAGE_REJECTED".to_string(),
            RedditApiError::NotAuthenticated => "REDDIT_NOT_AUTHENTICATED".to_string(),
            RedditApiError::Network { .. } => "REDDIT_NETWORK".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::Io { path, .. } => format!(
                "Configuration file '{}' could not be opened.",
                path.display()
            ),
            ConfigError::Parse { path, .. } => {
                format!("Configuration file '{}' is not valid JSON.", path.display())
            }
            ConfigError::Schema { path, violation } => match violation {
                SchemaViolation::MissingField { field } => format!(
                    "Required configuration field '{}' is missing in '{}'.",
                    field,
                    path.display()
                ),
                SchemaViolation::InvalidEntry { field, index, .. } => format!(
                    "Entry {} of '{}' in '{}' must be a non-empty string.",
                    index,
                    field,
                    path.display()
                ),
                _ => format!(
                    "Configuration file '{}' has an invalid layout: {}.",
                    path.display(),
                    violation
                ),
            },
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::Io { .. } => "CONFIG_IO".to_string(),
            ConfigError::Parse { .. } => "CONFIG_PARSE".to_string(),
            ConfigError::Schema { .. } => "CONFIG_SCHEMA".to_string(),
        }
    }
}

/// Emits diagnostics for errors that reach the top of the process.
pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    /// Writes the single diagnostic line for an error that terminates the process.
    pub fn report_fatal(&self, error: &CoreError) {
        if self.report_errors {
            error!(
                code = %error.error_code(),
                hint = %error.user_friendly_message(),
                "{}",
                error
            );
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
