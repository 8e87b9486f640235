use serde::Deserialize;
use thiserror::Error;

use crate::store::StorageError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 from the server. The session has already been cleared by the
    /// time the caller sees this.
    #[error("Session expired - please log in again")]
    SessionExpired { message: Option<String> },

    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape used by the server (`{"message": "..."}`)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// The server's `message` field, if the body is JSON and has one
    pub fn server_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let server_message = Self::server_message(body);
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return ApiError::SessionExpired {
                message: server_message,
            };
        }

        let message = server_message
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| Self::truncate_body(trimmed))
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        ApiError::Http {
            status: status.as_u16(),
            message,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. })
    }

    /// HTTP status, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::SessionExpired { .. } => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short text suitable for a status line
    pub fn user_message(&self) -> String {
        match self {
            ApiError::SessionExpired { .. } => {
                "Your session has expired. Please log in again.".to_string()
            }
            ApiError::Http { message, .. } => message.clone(),
            ApiError::Network(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::Network(_) => {
                "Unable to connect to server. Check your connection.".to_string()
            }
            ApiError::InvalidResponse(_) | ApiError::InvalidRequest(_) => {
                "Unexpected response from server".to_string()
            }
            ApiError::Storage(_) => "Could not access local storage".to_string(),
        }
    }
}
