//! Custom error types for sermon-review

use thiserror::Error;

/// Main error type for sermon-review operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never reached the review service
    #[error("Network error: {0}")]
    Network(String),

    /// The review service answered with a non-success status
    #[error("{message}")]
    Service { status: u16, message: String },

    /// The review service answered, but not with the expected JSON
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("No sermon is selected")]
    NoSermonSelected,

    #[error("Slide {0} not found")]
    SlideNotFound(u32),

    #[error("Suggestion '{suggestion_id}' not found on slide '{slide_id}'")]
    SuggestionNotFound {
        slide_id: String,
        suggestion_id: String,
    },

    #[error("Suggestion '{0}' is not being edited; use 'edit' first")]
    NotEditing(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Build a service error from a status code and the raw response body.
    ///
    /// FastAPI-style bodies (`{"detail": "..."}`) contribute their detail text;
    /// any other non-empty body is used verbatim.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| match value.get("detail") {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
                None => None,
            });

        let message = match detail {
            Some(d) if !d.is_empty() => d,
            _ if !body.trim().is_empty() => body.trim().to_string(),
            _ => format!("Request failed: {}", status),
        };

        Error::Service { status, message }
    }

    /// Whether the failure came from talking to the review service
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Service { .. } | Error::Malformed(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            Error::from_response(status.as_u16(), "")
        } else {
            Error::Network(err.to_string())
        }
    }
}

/// Result type alias for sermon-review
pub type Result<T> = std::result::Result<T, Error>;
