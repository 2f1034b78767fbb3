//! HTTP transport for the district administration backend.
//!
//! `ApiClient` owns the connection pool and the shared `ResponsePolicy`.
//! Endpoint groups live in sibling modules as `impl ApiClient` blocks.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::policy::{AuthScope, ResponsePolicy};
use super::ApiError;

/// Default backend location, matching the development server
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// API client for the district backend.
/// Clone is cheap - reqwest::Client and the policy are both Arc-backed.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    policy: ResponsePolicy,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, policy: ResponsePolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn policy(&self) -> &ResponsePolicy {
        &self.policy
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request through the policy and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        scope: AuthScope,
    ) -> Result<T, ApiError> {
        let (request, sent_token) = match scope {
            AuthScope::Authenticated => self.policy.authorize(request),
            AuthScope::Public => (request, None),
        };
        self.dispatch(request, scope, sent_token.as_deref()).await
    }

    /// Send with an explicit bearer token instead of the persisted one
    pub(crate) async fn send_json_with_token<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: &str,
    ) -> Result<T, ApiError> {
        let request = request.bearer_auth(token);
        self.dispatch(request, AuthScope::Authenticated, Some(token))
            .await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        scope: AuthScope,
        sent_token: Option<&str>,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        debug!(status = %response.status(), url = %response.url(), "Response received");

        let response = self.policy.check(response, scope, sent_token).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.request(Method::GET, path), AuthScope::Authenticated)
            .await
    }

    pub(crate) async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path).query(query);
        self.send_json(request, AuthScope::Authenticated).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::POST, path).json(body);
        self.send_json(request, AuthScope::Authenticated).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::PUT, path).json(body);
        self.send_json(request, AuthScope::Authenticated).await
    }

    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::PATCH, path).json(body);
        self.send_json(request, AuthScope::Authenticated).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.request(Method::DELETE, path), AuthScope::Authenticated)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;
    use std::sync::Arc;

    fn client(base: &str) -> ApiClient {
        let policy = ResponsePolicy::new(Arc::new(MemoryCredentialStore::new()));
        ApiClient::new(base, Duration::from_secs(DEFAULT_TIMEOUT_SECS), policy).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let api = client("http://localhost:8000/");
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.url("/auth/me"), "http://localhost:8000/auth/me");
    }

    #[test]
    fn test_authorize_attaches_bearer() {
        let policy = ResponsePolicy::new(Arc::new(MemoryCredentialStore::with_token("abc123")));
        let api = ApiClient::new(DEFAULT_BASE_URL, Duration::from_secs(1), policy).unwrap();

        let (request, sent) = api
            .policy()
            .authorize(api.request(Method::GET, "/tasks"));
        let request = request.build().unwrap();

        assert_eq!(sent.as_deref(), Some("abc123"));
        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer abc123"
        );
    }

    #[test]
    fn test_no_bearer_without_credential() {
        let api = client(DEFAULT_BASE_URL);
        let (request, sent) = api
            .policy()
            .authorize(api.request(Method::GET, "/tasks"));
        let request = request.build().unwrap();

        assert!(sent.is_none());
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }
}
