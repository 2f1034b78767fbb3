//! Identity endpoints: login, current user, user administration.

use reqwest::Method;
use tracing::debug;

use crate::models::{LoginRequest, LoginResponse, NewUser, User, UserUpdate};

use super::policy::AuthScope;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// `POST /auth/login`. A 401 here is `InvalidCredentials`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        debug!(username, "Authenticating");
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = self.request(Method::POST, "/auth/login").json(&body);
        self.send_json(request, AuthScope::Public).await
    }

    /// `GET /auth/me` with the persisted credential
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/auth/me").await
    }

    /// `GET /auth/me` with an explicit token
    pub async fn current_user_with_token(&self, token: &str) -> Result<User, ApiError> {
        let request = self.request(Method::GET, "/auth/me");
        self.send_json_with_token(request, token).await
    }

    pub async fn register(&self, user: &NewUser) -> Result<User, ApiError> {
        self.post("/auth/register", user).await
    }

    /// Administrators see everyone, department heads their department
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/auth/users").await
    }

    pub async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<User, ApiError> {
        self.put(&format!("/auth/users/{}", user_id), update).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<serde_json::Value, ApiError> {
        self.delete(&format!("/auth/users/{}", user_id)).await
    }
}
