//! Unified SDK error types.

use crate::validation::FieldErrors;
use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(#[from] FieldErrors),

    #[error("Maximum quantity of {max} reached for this item")]
    QuantityLimit { max: u32 },

    /// The backend answered with `success: false`.
    #[error("Rejected by server: {message}")]
    Rejected { message: String },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl SdkError {
    /// Cancellation of a superseded request. Never shown to the user.
    pub fn is_aborted(&self) -> bool {
        matches!(self, SdkError::Http(HttpError::Aborted))
    }

    /// Whether repeating the same action could succeed without the user
    /// changing anything (transport failures, 5xx, 429).
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::Http(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Short message suitable for a transient notice.
    pub fn user_message(&self) -> String {
        match self {
            SdkError::Http(HttpError::Connectivity(_)) => {
                "Could not reach the store. Check your connection and try again.".to_string()
            }
            SdkError::Http(HttpError::Unauthorized) | SdkError::Auth(_) => {
                "Please sign in to continue.".to_string()
            }
            SdkError::Http(_) => "Something went wrong. Please try again.".to_string(),
            SdkError::Validation(errors) => errors.to_string(),
            SdkError::QuantityLimit { max } => {
                format!("You can add at most {} of this item", max)
            }
            SdkError::Rejected { message } => message.clone(),
            SdkError::Serde(_) | SdkError::Io(_) | SdkError::Other(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The backend could not be reached at all.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The request was cancelled through its abort signal.
    #[error("Request aborted")]
    Aborted,

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request {status}: {body}")]
    BadRequest { status: u16, body: String },

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl HttpError {
    /// The HTTP status code, for errors produced by a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::ServerError { status, .. } | HttpError::BadRequest { status, .. } => {
                Some(*status)
            }
            HttpError::RateLimited { .. } => Some(429),
            HttpError::Unauthorized => Some(401),
            HttpError::NotFound(_) => Some(404),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::Connectivity(_)
            | HttpError::Timeout
            | HttpError::RateLimited { .. }
            | HttpError::MaxRetriesExceeded { .. } => true,
            HttpError::ServerError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Session expired")]
    SessionExpired,
}
