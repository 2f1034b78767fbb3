use thiserror::Error;

use crate::api::ApiError;
use crate::auth::CredentialError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Username and password required")]
    MissingCredentials,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to persist credential: {0}")]
    Storage(#[from] CredentialError),
}

impl SessionError {
    /// Short message suitable for the login form
    pub fn user_message(&self) -> String {
        match self {
            SessionError::MissingCredentials => self.to_string(),
            SessionError::Api(e) => e.user_message(),
            SessionError::Storage(_) => "Login succeeded but the session could not be saved".to_string(),
        }
    }

    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, SessionError::Api(ApiError::InvalidCredentials))
    }
}
