//! Route table and navigation resolution.

use std::fmt;

use crate::session::{guard, Guarded, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Performance,
    Resources,
    Tasks,
    Coordination,
    Geospatial,
    Reports,
    Analytics,
}

impl Route {
    /// Protected routes in menu order
    pub const PROTECTED: [Route; 8] = [
        Route::Dashboard,
        Route::Performance,
        Route::Resources,
        Route::Tasks,
        Route::Coordination,
        Route::Geospatial,
        Route::Reports,
        Route::Analytics,
    ];

    /// Landing route after login and for `/`
    pub const DEFAULT: Route = Route::Dashboard;

    pub fn parse(path: &str) -> Option<Route> {
        let path = path.trim_end_matches('/');
        match path {
            "/login" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            "/performance" => Some(Route::Performance),
            "/resources" => Some(Route::Resources),
            "/tasks" => Some(Route::Tasks),
            "/coordination" => Some(Route::Coordination),
            "/geospatial" => Some(Route::Geospatial),
            "/reports" => Some(Route::Reports),
            "/analytics" => Some(Route::Analytics),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Performance => "/performance",
            Route::Resources => "/resources",
            Route::Tasks => "/tasks",
            Route::Coordination => "/coordination",
            Route::Geospatial => "/geospatial",
            Route::Reports => "/reports",
            Route::Analytics => "/analytics",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::Performance => "Performance",
            Route::Resources => "Resources",
            Route::Tasks => "Tasks",
            Route::Coordination => "Coordination",
            Route::Geospatial => "Geospatial",
            Route::Reports => "Reports",
            Route::Analytics => "Analytics",
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Position in the menu, `None` for the login route
    pub fn index(&self) -> Option<usize> {
        Self::PROTECTED.iter().position(|r| r == self)
    }

    pub fn from_index(index: usize) -> Option<Route> {
        Self::PROTECTED.get(index).copied()
    }

    /// Next menu item, wrapping around
    pub fn next(&self) -> Route {
        match self.index() {
            Some(i) => Self::PROTECTED[(i + 1) % Self::PROTECTED.len()],
            None => Self::DEFAULT,
        }
    }

    /// Previous menu item, wrapping around
    pub fn prev(&self) -> Route {
        match self.index() {
            Some(0) => Self::PROTECTED[Self::PROTECTED.len() - 1],
            Some(i) => Self::PROTECTED[i - 1],
            None => Self::DEFAULT,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where a requested path ends up for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Show(Route),
    /// Replace the location with this route
    Redirect(Route),
    /// Session still resolving; show the loading indicator
    Loading,
    NotFound,
}

pub fn resolve(path: &str, session: &Session) -> Navigation {
    if path.is_empty() || path == "/" {
        return Navigation::Redirect(Route::DEFAULT);
    }

    // Everything except the login page sits behind the guard, unknown
    // paths included.
    let route = Route::parse(path);
    if !matches!(route, Some(Route::Login)) {
        return match guard(session, |_| route) {
            Guarded::Content(Some(route)) => Navigation::Show(route),
            Guarded::Content(None) => Navigation::NotFound,
            Guarded::Redirect(to) => Navigation::Redirect(to),
            Guarded::Loading => Navigation::Loading,
        };
    }

    if session.is_authenticated() && !session.is_loading {
        Navigation::Redirect(Route::DEFAULT)
    } else {
        Navigation::Show(Route::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};

    fn logged_in() -> Session {
        Session::logged_in(User::new("staff", "Staff Member", Role::Staff, None))
    }

    #[test]
    fn test_parse_roundtrip() {
        for route in Route::PROTECTED.iter().chain([Route::Login].iter()) {
            assert_eq!(Route::parse(route.path()), Some(*route));
        }
        assert_eq!(Route::parse("/tasks/"), Some(Route::Tasks));
        assert_eq!(Route::parse("/settings"), None);
    }

    #[test]
    fn test_menu_navigation_wraps() {
        assert_eq!(Route::Dashboard.next(), Route::Performance);
        assert_eq!(Route::Analytics.next(), Route::Dashboard);
        assert_eq!(Route::Dashboard.prev(), Route::Analytics);
        assert_eq!(Route::Login.next(), Route::Dashboard);
        assert_eq!(Route::from_index(3), Some(Route::Tasks));
        assert_eq!(Route::from_index(8), None);
    }

    #[test]
    fn test_root_redirects_to_dashboard() {
        assert_eq!(
            resolve("/", &Session::logged_out()),
            Navigation::Redirect(Route::Dashboard)
        );
    }

    #[test]
    fn test_protected_routes_follow_guard() {
        assert_eq!(
            resolve("/tasks", &Session::initializing()),
            Navigation::Loading
        );
        assert_eq!(
            resolve("/tasks", &Session::logged_out()),
            Navigation::Redirect(Route::Login)
        );
        assert_eq!(
            resolve("/tasks", &logged_in()),
            Navigation::Show(Route::Tasks)
        );
    }

    #[test]
    fn test_login_route() {
        assert_eq!(
            resolve("/login", &Session::logged_out()),
            Navigation::Show(Route::Login)
        );
        assert_eq!(
            resolve("/login", &logged_in()),
            Navigation::Redirect(Route::Dashboard)
        );
    }

    #[test]
    fn test_unknown_path_is_guarded() {
        assert_eq!(resolve("/nowhere", &logged_in()), Navigation::NotFound);
        assert_eq!(
            resolve("/nowhere", &Session::logged_out()),
            Navigation::Redirect(Route::Login)
        );
        assert_eq!(
            resolve("/nowhere", &Session::initializing()),
            Navigation::Loading
        );
    }
}
