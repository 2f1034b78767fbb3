use async_trait::async_trait;

use crate::api::{ApiClient, ApiError};
use crate::models::{LoginResponse, User};

/// Remote identity collaborator consumed by the session store
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a token and the user it belongs to.
    /// Fails with `InvalidCredentials`, `ServerError` or `NetworkError`.
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<LoginResponse, ApiError>;

    /// Resolve a token to its user. Fails with `Unauthorized` or `NetworkError`.
    async fn current_user(&self, token: &str) -> Result<User, ApiError>;
}

#[async_trait]
impl IdentityProvider for ApiClient {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        ApiClient::authenticate(self, username, password).await
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.current_user_with_token(token).await
    }
}
