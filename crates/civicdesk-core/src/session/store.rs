//! The session store: single source of truth for who is logged in.
//!
//! ```text
//! Initializing ──initialize()──> LoggedIn | LoggedOut
//! LoggedIn ──logout() / any 401──> LoggedOut
//! LoggedOut ──login() ok──> LoggedIn
//! ```
//!
//! All operations take `&self`; share the store behind an `Arc` to drive
//! it from background tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ResponsePolicy};
use crate::auth::CredentialStore;
use crate::models::LoginResponse;

use super::identity::IdentityProvider;
use super::state::{Phase, Session, SessionCell};
use super::SessionError;

pub struct SessionStore<I> {
    identity: I,
    policy: ResponsePolicy,
    credentials: Arc<dyn CredentialStore>,
    cell: SessionCell,
    started: AtomicBool,
}

impl SessionStore<ApiClient> {
    /// Store backed by the HTTP client, sharing its credential store and
    /// subscribed to its 401 handling.
    pub fn from_client(api: ApiClient) -> Self {
        let policy = api.policy().clone();
        Self::new(api, &policy)
    }
}

impl<I: IdentityProvider> SessionStore<I> {
    /// Create the store in the `Initializing` phase and subscribe it to
    /// the policy's forced-logout notifications.
    pub fn new(identity: I, policy: &ResponsePolicy) -> Self {
        let cell = SessionCell::new();
        policy.subscribe(cell.observer());
        Self {
            identity,
            policy: policy.clone(),
            credentials: policy.credentials().clone(),
            cell,
            started: AtomicBool::new(false),
        }
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn session(&self) -> Session {
        self.cell.snapshot()
    }

    /// Receiver that observes every session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.cell.subscribe()
    }

    pub fn phase(&self) -> Phase {
        if self.cell.is_initializing() {
            Phase::Initializing
        } else if self.session().is_authenticated() {
            Phase::LoggedIn
        } else {
            Phase::LoggedOut
        }
    }

    /// Resolve the persisted credential into a user. Runs once per process;
    /// later calls return the current phase untouched.
    ///
    /// Every failure lands in `LoggedOut` with the credential erased.
    pub async fn initialize(&self) -> Phase {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("Session already initialized");
            return self.phase();
        }

        let token = match self.credentials.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                self.erase_if_current(None);
                None
            }
        };

        let Some(token) = token else {
            debug!("No stored credential");
            self.cell.finish_initializing(None);
            return self.phase();
        };

        match self.identity.current_user(&token).await {
            Ok(user) => {
                info!(username = %user.username, role = %user.role, "Session restored");
                self.cell.finish_initializing(Some(user));
            }
            Err(e) => {
                info!(error = %e, "Stored credential rejected, starting logged out");
                self.erase_if_current(Some(&token));
                self.cell.finish_initializing(None);
            }
        }
        self.phase()
    }

    /// Authenticate, persist the returned token and publish the user.
    ///
    /// On failure nothing changes and the error is returned as-is.
    /// Concurrent logins are not de-duplicated; the last to resolve wins.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, SessionError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }

        let _in_flight = self.cell.begin_login();
        let response = self.identity.authenticate(username, password).await?;

        {
            let _lock = self.policy.lock_credential();
            let credentials = &self.credentials;
            let token = response.access_token.as_str();
            self.cell
                .commit_user(response.user.clone(), || credentials.save(token))?;
        }

        info!(username = %response.user.username, role = %response.user.role, "Login successful");
        Ok(response)
    }

    /// Erase the credential and drop the user. Never fails; idempotent.
    pub fn logout(&self) {
        let _lock = self.policy.lock_credential();
        let credentials = &self.credentials;
        self.cell.clear_user(|| {
            if let Err(e) = credentials.erase() {
                warn!(error = %e, "Failed to erase credential on logout");
            }
        });
        info!("Logged out");
    }

    /// Erase the stored credential unless a different one replaced it
    fn erase_if_current(&self, token: Option<&str>) {
        let _lock = self.policy.lock_credential();
        if let (Some(token), Ok(Some(stored))) = (token, self.credentials.load()) {
            if stored != token {
                debug!("Stored credential changed meanwhile, keeping it");
                return;
            }
        }
        if let Err(e) = self.credentials.erase() {
            warn!(error = %e, "Failed to erase credential");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, AuthScope};
    use crate::auth::{CredentialError, MemoryCredentialStore};
    use crate::models::{Role, User};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeIdentity {
        /// username -> (password, user)
        accounts: HashMap<String, (String, User)>,
        /// token -> user
        tokens: HashMap<String, User>,
        /// Logins for this username wait on the notify before answering
        gate: Option<(String, Arc<Notify>)>,
        auth_calls: AtomicUsize,
        me_calls: AtomicUsize,
    }

    impl FakeIdentity {
        fn with_account(mut self, password: &str, user: User) -> Self {
            self.accounts
                .insert(user.username.clone(), (password.to_string(), user));
            self
        }

        fn with_token(mut self, token: &str, user: User) -> Self {
            self.tokens.insert(token.to_string(), user);
            self
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn authenticate(
            &self,
            username: &str,
            password: &str,
        ) -> Result<LoginResponse, ApiError> {
            self.auth_calls.fetch_add(1, Ordering::SeqCst);
            if let Some((gated, notify)) = &self.gate {
                if gated == username {
                    notify.notified().await;
                }
            }
            match self.accounts.get(username) {
                Some((expected, user)) if expected == password => Ok(LoginResponse {
                    access_token: format!("token-{}", username),
                    token_type: "bearer".to_string(),
                    user: user.clone(),
                }),
                _ => Err(ApiError::InvalidCredentials),
            }
        }

        async fn current_user(&self, token: &str) -> Result<User, ApiError> {
            self.me_calls.fetch_add(1, Ordering::SeqCst);
            self.tokens.get(token).cloned().ok_or(ApiError::Unauthorized)
        }
    }

    /// Fails every call the way a dead network would
    struct OfflineIdentity;

    #[async_trait]
    impl IdentityProvider for OfflineIdentity {
        async fn authenticate(&self, _: &str, _: &str) -> Result<LoginResponse, ApiError> {
            Err(ApiError::ServerError("connection refused".into()))
        }

        async fn current_user(&self, _: &str) -> Result<User, ApiError> {
            Err(ApiError::ServerError("connection refused".into()))
        }
    }

    /// Memory store with a scripted failure mode and a one-shot hook that
    /// runs right after the next `load`
    #[derive(Default)]
    struct ScriptedStore {
        inner: MemoryCredentialStore,
        fail_load: bool,
        erase_calls: AtomicUsize,
        after_load: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    }

    impl ScriptedStore {
        fn with_token(token: &str) -> Self {
            Self {
                inner: MemoryCredentialStore::with_token(token),
                ..Self::default()
            }
        }

        fn unreadable() -> Self {
            Self {
                fail_load: true,
                ..Self::default()
            }
        }
    }

    impl CredentialStore for ScriptedStore {
        fn load(&self) -> Result<Option<String>, CredentialError> {
            let result = if self.fail_load {
                let corrupt = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                Err(CredentialError::Corrupt(corrupt))
            } else {
                self.inner.load()
            };
            let hook = self.after_load.lock().unwrap().take();
            if let Some(hook) = hook {
                hook();
            }
            result
        }

        fn save(&self, token: &str) -> Result<(), CredentialError> {
            self.inner.save(token)
        }

        fn erase(&self) -> Result<(), CredentialError> {
            self.erase_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.erase()
        }
    }

    fn admin() -> User {
        User::new("admin", "System Administrator", Role::Administrator, Some("Administration"))
    }

    fn staff() -> User {
        User::new("staff", "Staff Member", Role::Staff, Some("Public Works"))
    }

    fn store_with<I: IdentityProvider>(
        identity: I,
        token: Option<&str>,
    ) -> (SessionStore<I>, ResponsePolicy) {
        let credentials: Arc<dyn CredentialStore> = match token {
            Some(t) => Arc::new(MemoryCredentialStore::with_token(t)),
            None => Arc::new(MemoryCredentialStore::new()),
        };
        let policy = ResponsePolicy::new(credentials);
        (SessionStore::new(identity, &policy), policy)
    }

    // -------------------------------------------------------------------------
    // Initialize
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_starts_initializing() {
        let (store, _) = store_with(FakeIdentity::default(), None);
        assert_eq!(store.phase(), Phase::Initializing);
        assert_eq!(store.session(), Session::initializing());
    }

    #[tokio::test]
    async fn test_initialize_without_credential() {
        let identity = FakeIdentity::default();
        let (store, _) = store_with(identity, None);

        assert_eq!(store.initialize().await, Phase::LoggedOut);
        assert_eq!(store.session(), Session::logged_out());
        // No credential means no remote call
        assert_eq!(store.identity().me_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initialize_restores_user() {
        let identity = FakeIdentity::default().with_token("abc123", admin());
        let (store, policy) = store_with(identity, Some("abc123"));

        assert_eq!(store.initialize().await, Phase::LoggedIn);

        let session = store.session();
        assert!(!session.is_loading);
        assert_eq!(session.username(), Some("admin"));
        assert_eq!(session.user.unwrap().role, Role::Administrator);
        assert_eq!(policy.bearer_token().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_initialize_with_rejected_credential() {
        let identity = FakeIdentity::default();
        let (store, policy) = store_with(identity, Some("expired"));

        assert_eq!(store.initialize().await, Phase::LoggedOut);
        assert_eq!(store.session(), Session::logged_out());
        assert_eq!(policy.bearer_token(), None);
    }

    #[tokio::test]
    async fn test_initialize_with_unreachable_server() {
        let (store, policy) = store_with(OfflineIdentity, Some("abc123"));

        assert_eq!(store.initialize().await, Phase::LoggedOut);
        assert_eq!(store.session(), Session::logged_out());
        assert_eq!(policy.bearer_token(), None);
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let identity = FakeIdentity::default().with_token("abc123", admin());
        let (store, _) = store_with(identity, Some("abc123"));

        store.initialize().await;
        store.logout();
        assert_eq!(store.initialize().await, Phase::LoggedOut);
        assert_eq!(store.identity().me_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_initialize_with_unreadable_credential() {
        let credentials = Arc::new(ScriptedStore::unreadable());
        let policy = ResponsePolicy::new(credentials.clone());
        let store = SessionStore::new(FakeIdentity::default(), &policy);

        assert_eq!(store.initialize().await, Phase::LoggedOut);
        assert!(!store.session().is_loading);
        assert_eq!(store.session(), Session::logged_out());
        assert_eq!(credentials.erase_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.identity().me_calls.load(Ordering::SeqCst), 0);
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_login_persists_token_and_user() {
        let identity = FakeIdentity::default().with_account("admin123", admin());
        let (store, policy) = store_with(identity, None);
        store.initialize().await;

        let response = store.login("admin", "admin123").await.unwrap();

        assert_eq!(response.access_token, "token-admin");
        assert_eq!(response.user, admin());
        assert_eq!(policy.bearer_token().as_deref(), Some("token-admin"));
        assert_eq!(store.session(), Session::logged_in(admin()));
        assert_eq!(store.phase(), Phase::LoggedIn);
    }

    #[tokio::test]
    async fn test_login_rejected_leaves_state_unchanged() {
        let identity = FakeIdentity::default().with_account("staff123", staff());
        let (store, policy) = store_with(identity, None);
        store.initialize().await;
        let before = store.session();

        let err = store.login("staff", "wrongpass").await.unwrap_err();

        assert!(err.is_invalid_credentials());
        assert_eq!(err.user_message(), "Invalid username or password");
        assert_eq!(store.session(), before);
        assert_eq!(store.session(), Session::logged_out());
        assert_eq!(policy.bearer_token(), None);
    }

    #[tokio::test]
    async fn test_login_rejected_keeps_existing_session() {
        let identity = FakeIdentity::default()
            .with_token("abc123", admin())
            .with_account("staff123", staff());
        let (store, policy) = store_with(identity, Some("abc123"));
        store.initialize().await;

        assert!(store.login("staff", "nope").await.is_err());

        assert_eq!(store.session(), Session::logged_in(admin()));
        assert_eq!(policy.bearer_token().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_login_requires_input() {
        let (store, _) = store_with(FakeIdentity::default(), None);

        assert!(matches!(
            store.login("", "pw").await,
            Err(SessionError::MissingCredentials)
        ));
        assert!(matches!(
            store.login("admin", "").await,
            Err(SessionError::MissingCredentials)
        ));
        assert_eq!(store.identity().auth_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_overwrites_previous_credential() {
        let identity = FakeIdentity::default()
            .with_token("abc123", admin())
            .with_account("staff123", staff());
        let (store, policy) = store_with(identity, Some("abc123"));
        store.initialize().await;

        store.login("staff", "staff123").await.unwrap();

        assert_eq!(policy.bearer_token().as_deref(), Some("token-staff"));
        assert_eq!(store.session().username(), Some("staff"));
    }

    #[tokio::test]
    async fn test_login_raises_loading_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let identity = FakeIdentity {
            gate: Some(("admin".to_string(), gate.clone())),
            ..FakeIdentity::default().with_account("admin123", admin())
        };
        let (store, _) = store_with(identity, None);
        store.initialize().await;
        let mut rx = store.subscribe();

        let (result, saw_loading) = tokio::join!(store.login("admin", "admin123"), async {
            rx.changed().await.unwrap();
            let loading = rx.borrow_and_update().is_loading;
            gate.notify_one();
            loading
        });

        assert!(result.is_ok());
        assert!(saw_loading);
        assert!(!store.session().is_loading);
    }

    #[tokio::test]
    async fn test_concurrent_logins_last_response_wins() {
        let gate = Arc::new(Notify::new());
        let identity = FakeIdentity {
            gate: Some(("admin".to_string(), gate.clone())),
            ..FakeIdentity::default()
                .with_account("admin123", admin())
                .with_account("staff123", staff())
        };
        let (store, policy) = store_with(identity, None);
        store.initialize().await;

        // The admin login is issued first but resolves last
        let (slow, fast) = tokio::join!(store.login("admin", "admin123"), async {
            let result = store.login("staff", "staff123").await;
            gate.notify_one();
            result
        });

        assert!(slow.is_ok() && fast.is_ok());
        assert_eq!(store.session(), Session::logged_in(admin()));
        assert_eq!(policy.bearer_token().as_deref(), Some("token-admin"));
    }

    // -------------------------------------------------------------------------
    // Logout and forced logout
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let identity = FakeIdentity::default().with_token("abc123", admin());
        let (store, policy) = store_with(identity, Some("abc123"));
        store.initialize().await;

        store.logout();
        assert_eq!(store.session(), Session::logged_out());
        assert_eq!(policy.bearer_token(), None);

        store.logout();
        assert_eq!(store.session(), Session::logged_out());
        assert_eq!(store.phase(), Phase::LoggedOut);
    }

    #[tokio::test]
    async fn test_unauthorized_anywhere_forces_logout() {
        let identity = FakeIdentity::default().with_token("abc123", admin());
        let (store, policy) = store_with(identity, Some("abc123"));
        store.initialize().await;
        assert_eq!(store.phase(), Phase::LoggedIn);

        // A 401 seen by some unrelated page fetch
        policy.reject(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"detail":"Invalid authentication credentials"}"#,
            AuthScope::Authenticated,
            Some("abc123"),
        );

        assert_eq!(store.phase(), Phase::LoggedOut);
        assert_eq!(store.session(), Session::logged_out());
        assert_eq!(policy.bearer_token(), None);
    }

    #[tokio::test]
    async fn test_stale_unauthorized_cannot_undo_newer_login() {
        let credentials = Arc::new(ScriptedStore::with_token("old-token"));
        let policy = ResponsePolicy::new(credentials.clone());
        let identity = FakeIdentity::default()
            .with_token("old-token", staff())
            .with_account("admin123", admin());
        let store = Arc::new(SessionStore::new(identity, &policy));
        assert_eq!(store.initialize().await, Phase::LoggedIn);

        // Start a login on another thread right after the revocation has
        // read the stored token
        let login = Arc::new(Mutex::new(None));
        {
            let store = Arc::clone(&store);
            let login = Arc::clone(&login);
            *credentials.after_load.lock().unwrap() = Some(Box::new(move || {
                let handle = std::thread::spawn(move || {
                    futures::executor::block_on(store.login("admin", "admin123"))
                });
                std::thread::sleep(Duration::from_millis(50));
                *login.lock().unwrap() = Some(handle);
            }));
        }

        policy.revoke(Some("old-token"));

        let handle = login.lock().unwrap().take().unwrap();
        let response = handle.join().unwrap().unwrap();

        assert_eq!(response.access_token, "token-admin");
        assert_eq!(credentials.load().unwrap().as_deref(), Some("token-admin"));
        assert_eq!(store.session(), Session::logged_in(admin()));
    }
}
