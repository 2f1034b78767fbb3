use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::api::UnauthorizedObserver;
use crate::models::User;

/// Snapshot of who is logged in.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub is_loading: bool,
}

impl Session {
    /// State at process start, before the persisted credential is resolved
    pub fn initializing() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    pub fn logged_out() -> Self {
        Self {
            user: None,
            is_loading: false,
        }
    }

    pub fn logged_in(user: User) -> Self {
        Self {
            user: Some(user),
            is_loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

/// Lifecycle phase of the session store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    LoggedIn,
    LoggedOut,
}

/// Shared, observable session state.
///
/// `is_loading` is derived from two counters: the one-time initialization
/// window and the number of logins in flight. Both are only changed inside
/// `send_modify` so the published snapshot stays consistent with them.
#[derive(Clone)]
pub(crate) struct SessionCell {
    inner: Arc<CellInner>,
}

struct CellInner {
    tx: watch::Sender<Session>,
    initializing: AtomicBool,
    pending_logins: AtomicUsize,
}

impl CellInner {
    fn loading(&self) -> bool {
        self.initializing.load(Ordering::SeqCst) || self.pending_logins.load(Ordering::SeqCst) > 0
    }

    fn update(&self, f: impl FnOnce(&mut Session)) {
        self.tx.send_modify(|session| {
            f(session);
            session.is_loading = self.loading();
        });
    }
}

impl UnauthorizedObserver for CellInner {
    fn on_unauthorized(&self) {
        self.update(|session| session.user = None);
    }
}

impl SessionCell {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::initializing());
        Self {
            inner: Arc::new(CellInner {
                tx,
                initializing: AtomicBool::new(true),
                pending_logins: AtomicUsize::new(0),
            }),
        }
    }

    pub(crate) fn observer(&self) -> Arc<dyn UnauthorizedObserver> {
        self.inner.clone()
    }

    pub(crate) fn snapshot(&self) -> Session {
        self.inner.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.tx.subscribe()
    }

    pub(crate) fn is_initializing(&self) -> bool {
        self.inner.initializing.load(Ordering::SeqCst)
    }

    /// Leave the initialization window. A `None` user leaves any user set
    /// by a login that raced initialization in place.
    pub(crate) fn finish_initializing(&self, user: Option<User>) {
        self.inner.update(|session| {
            self.inner.initializing.store(false, Ordering::SeqCst);
            if let Some(user) = user {
                session.user = Some(user);
            }
        });
    }

    pub(crate) fn begin_login(&self) -> LoginInFlight<'_> {
        self.inner.update(|_| {
            self.inner.pending_logins.fetch_add(1, Ordering::SeqCst);
        });
        LoginInFlight { cell: self }
    }

    /// Run `persist` and publish `user` as one step, so the credential and
    /// the user can never disagree for observers.
    pub(crate) fn commit_user<E>(
        &self,
        user: User,
        persist: impl FnOnce() -> Result<(), E>,
    ) -> Result<(), E> {
        let mut result = Ok(());
        self.inner.update(|session| match persist() {
            Ok(()) => session.user = Some(user),
            Err(e) => result = Err(e),
        });
        result
    }

    /// Run `erase` and clear the user as one step
    pub(crate) fn clear_user(&self, erase: impl FnOnce()) {
        self.inner.update(|session| {
            erase();
            session.user = None;
        });
    }
}

/// Holds `is_loading` up for the duration of a login call, including when
/// the login future is dropped mid-flight.
pub(crate) struct LoginInFlight<'a> {
    cell: &'a SessionCell,
}

impl Drop for LoginInFlight<'_> {
    fn drop(&mut self) {
        self.cell.inner.update(|_| {
            self.cell.inner.pending_logins.fetch_sub(1, Ordering::SeqCst);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn admin() -> User {
        User::new("admin", "System Administrator", Role::Administrator, None)
    }

    #[test]
    fn test_cell_starts_initializing() {
        let cell = SessionCell::new();
        assert_eq!(cell.snapshot(), Session::initializing());
        assert!(cell.is_initializing());
    }

    #[test]
    fn test_login_in_flight_raises_loading() {
        let cell = SessionCell::new();
        cell.finish_initializing(None);
        assert!(!cell.snapshot().is_loading);

        let first = cell.begin_login();
        let second = cell.begin_login();
        assert!(cell.snapshot().is_loading);

        drop(first);
        assert!(cell.snapshot().is_loading);
        drop(second);
        assert!(!cell.snapshot().is_loading);
    }

    #[test]
    fn test_finish_initializing_keeps_raced_login() {
        let cell = SessionCell::new();
        cell.commit_user(admin(), || Ok::<(), ()>(())).unwrap();
        cell.finish_initializing(None);

        assert_eq!(cell.snapshot(), Session::logged_in(admin()));
    }

    #[test]
    fn test_commit_user_failure_leaves_user_unset() {
        let cell = SessionCell::new();
        cell.finish_initializing(None);

        let result = cell.commit_user(admin(), || Err("disk full"));

        assert_eq!(result, Err("disk full"));
        assert_eq!(cell.snapshot(), Session::logged_out());
    }

    #[test]
    fn test_observer_clears_user() {
        let cell = SessionCell::new();
        cell.finish_initializing(Some(admin()));
        let mut rx = cell.subscribe();

        cell.observer().on_unauthorized();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().clone(), Session::logged_out());
    }
}
