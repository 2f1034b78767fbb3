//! Shared request/response policy.
//!
//! Every outbound request goes through `ResponsePolicy::authorize`, which
//! attaches the persisted bearer token, and every response goes through
//! `ResponsePolicy::check`. A 401 on an authenticated call erases the
//! persisted credential and notifies subscribed observers so the session
//! drops to logged-out no matter which endpoint saw the rejection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::{RequestBuilder, Response};
use tracing::{debug, info, warn};

use crate::auth::CredentialStore;

use super::ApiError;

/// Whether a call carries the session credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScope {
    /// Login and other anonymous endpoints. A 401 here means bad input,
    /// not an expired session.
    Public,
    Authenticated,
}

/// Notified when the server rejects the session credential
pub trait UnauthorizedObserver: Send + Sync {
    fn on_unauthorized(&self);
}

#[derive(Clone)]
pub struct ResponsePolicy {
    inner: Arc<PolicyInner>,
}

struct PolicyInner {
    credentials: Arc<dyn CredentialStore>,
    observers: Mutex<Vec<Arc<dyn UnauthorizedObserver>>>,
    /// Held by every read-compare-write of the stored credential and
    /// the session change that goes with it
    credential_lock: Mutex<()>,
}

impl ResponsePolicy {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            inner: Arc::new(PolicyInner {
                credentials,
                observers: Mutex::new(Vec::new()),
                credential_lock: Mutex::new(()),
            }),
        }
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.credentials
    }

    pub fn subscribe(&self, observer: Arc<dyn UnauthorizedObserver>) {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Serialize a credential change with revocation. Not reentrant:
    /// never call `revoke` while holding it.
    pub(crate) fn lock_credential(&self) -> MutexGuard<'_, ()> {
        self.inner
            .credential_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Currently persisted token. Storage failures read as "no token".
    pub fn bearer_token(&self) -> Option<String> {
        match self.inner.credentials.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                None
            }
        }
    }

    /// Attach the persisted bearer token, if any.
    /// Returns the token that was attached so `check` can tell stale
    /// rejections apart from current ones.
    pub fn authorize(&self, request: RequestBuilder) -> (RequestBuilder, Option<String>) {
        match self.bearer_token() {
            Some(token) => (request.bearer_auth(&token), Some(token)),
            None => (request, None),
        }
    }

    /// Pass successful responses through, map failures to `ApiError`.
    pub async fn check(
        &self,
        response: Response,
        scope: AuthScope,
        sent_token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(self.reject(status, &body, scope, sent_token))
    }

    /// Classify a failed response and run the forced-logout path on 401.
    pub fn reject(
        &self,
        status: reqwest::StatusCode,
        body: &str,
        scope: AuthScope,
        sent_token: Option<&str>,
    ) -> ApiError {
        match ApiError::from_status(status, body) {
            ApiError::Unauthorized if scope == AuthScope::Public => ApiError::InvalidCredentials,
            ApiError::Unauthorized => {
                self.revoke(sent_token);
                ApiError::Unauthorized
            }
            other => other,
        }
    }

    /// Erase the persisted credential and notify observers.
    ///
    /// Skipped when the stored token no longer matches the one the
    /// rejected request carried: a newer login replaced it meanwhile.
    /// The compare, the erase and the observer calls run under the
    /// credential lock, so a login cannot commit in between.
    pub fn revoke(&self, sent_token: Option<&str>) {
        let _lock = self.lock_credential();
        let stored = self.bearer_token();
        if let (Some(sent), Some(stored)) = (sent_token, stored.as_deref()) {
            if sent != stored {
                debug!("Ignoring 401 for a superseded credential");
                return;
            }
        }

        if let Err(e) = self.inner.credentials.erase() {
            warn!(error = %e, "Failed to erase rejected credential");
        }
        info!("Credential rejected by server, session cleared");

        let observers = self
            .inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.on_unauthorized();
        }
    }
}
