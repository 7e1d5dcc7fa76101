use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures surfaced by [`crate::CatalogClient`].
pub enum CatalogError {
    /// No credential is configured; no request was sent.
    #[error("no API key configured")]
    MissingApiKey,
    /// The API rejected the credential (HTTP 401).
    #[error("API key rejected (401)")]
    Unauthorized,
    /// The requested resource does not exist (HTTP 404).
    #[error("resource not found (404)")]
    NotFound,
    /// The API failed on its side (HTTP 5xx).
    #[error("server error ({status})")]
    Server {
        /// HTTP status code.
        status: u16,
    },
    /// Any other non-success HTTP status.
    #[error("request failed ({status}): {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// `status_message` from the API error body, or the raw body.
        message: String,
    },
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The request exceeded its timeout.
    #[error("request timed out")]
    Timeout,
    /// The response body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    status_message: Option<String>,
}

impl CatalogError {
    /// Maps a non-success HTTP status and its body to an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            500..=599 => Self::Server { status },
            _ => {
                let message = serde_json::from_str::<ApiErrorBody>(body)
                    .ok()
                    .and_then(|parsed| parsed.status_message)
                    .unwrap_or_else(|| body.trim().to_string());
                Self::Http { status, message }
            }
        }
    }

    /// Returns `true` when retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout | Self::Server { .. } | Self::Http { status: 429, .. }
        )
    }

    /// Short text for the inline error shown by the section that issued the request.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingApiKey => "Sign in with your TMDB API key to load movies.".to_string(),
            Self::Unauthorized => "API authentication failed. Check your API key.".to_string(),
            Self::NotFound => "The requested movie could not be found.".to_string(),
            Self::Server { .. } => {
                "The movie service is having trouble. Try again later.".to_string()
            }
            Self::Http { message, .. } if !message.is_empty() => message.clone(),
            Self::Http { status, .. } => format!("Request failed ({status})."),
            Self::Network(_) => "Network error: could not reach the movie service.".to_string(),
            Self::Timeout => "The movie service took too long to respond.".to_string(),
            Self::Decode(_) => {
                "Received an unexpected response from the movie service.".to_string()
            }
        }
    }
}
