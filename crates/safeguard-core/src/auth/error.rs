use thiserror::Error;

use crate::api::ApiError;
use crate::store::StorageError;

/// Message shown when the server rejects credentials without saying why
pub const DEFAULT_REJECTED_MESSAGE: &str = "Invalid username or password";

#[derive(Error, Debug)]
pub enum AuthError {
    /// Input refused before any request was made
    #[error("{0}")]
    Validation(String),

    /// The server refused the credentials
    #[error("{0}")]
    Rejected(String),

    #[error("A login is already in progress")]
    Busy,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Could not save session: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Short text for the login screen
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(msg) | AuthError::Rejected(msg) => msg.clone(),
            AuthError::Busy => self.to_string(),
            AuthError::Api(e) => e.user_message(),
            AuthError::Storage(_) => "Could not save your session on this device".to_string(),
        }
    }
}
