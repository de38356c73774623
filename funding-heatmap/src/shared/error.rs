use thiserror::Error;

/// Message shown for transport and shape failures.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data from server";

/// Message shown for `success:false` responses without a server-supplied error.
pub const APPLICATION_FALLBACK_MESSAGE: &str = "Failed to fetch data";

/// All errors produced while acquiring a funding snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("endpoint reported failure: {}", .0.as_deref().unwrap_or("<no message>"))]
    Application(Option<String>),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// User-facing text stored in the catalog's error message.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Transport(_) | FetchError::Malformed(_) => FETCH_FAILED_MESSAGE.to_string(),
            FetchError::Application(message) => message
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(APPLICATION_FALLBACK_MESSAGE)
                .to_string(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Malformed(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value.to_string())
    }
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid API base url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid value for {name}: {value:?} (expected a positive integer)")]
    InvalidNumber { name: &'static str, value: String },
}
