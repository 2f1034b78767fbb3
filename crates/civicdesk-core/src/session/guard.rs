//! Route guard for protected screens.
//!
//! The guard is a pure function of the current session: while the session
//! is loading it shows a loading indicator, without a user it redirects to
//! the login screen, otherwise it renders the protected content.

use crate::models::User;
use crate::routes::Route;

use super::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Loading,
    RedirectToLogin,
    Render,
}

/// Decide what a protected route shows for `session`.
/// Loading takes precedence over the user check.
pub fn evaluate(session: &Session) -> GuardDecision {
    if session.is_loading {
        GuardDecision::Loading
    } else if session.user.is_none() {
        GuardDecision::RedirectToLogin
    } else {
        GuardDecision::Render
    }
}

/// Outcome of guarding some protected content
#[derive(Debug, Clone, PartialEq)]
pub enum Guarded<T> {
    Loading,
    /// Replace the current location with this route
    Redirect(Route),
    Content(T),
}

impl<T> Guarded<T> {
    pub fn content(self) -> Option<T> {
        match self {
            Guarded::Content(content) => Some(content),
            _ => None,
        }
    }
}

/// Run `content` for the logged-in user, or report why it was not run.
/// `content` is never invoked unless the decision is `Render`.
pub fn guard<T>(session: &Session, content: impl FnOnce(&User) -> T) -> Guarded<T> {
    match (evaluate(session), session.user.as_ref()) {
        (GuardDecision::Render, Some(user)) => Guarded::Content(content(user)),
        (GuardDecision::Loading, _) => Guarded::Loading,
        _ => Guarded::Redirect(Route::Login),
    }
}
