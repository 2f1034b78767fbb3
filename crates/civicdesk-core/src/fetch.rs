//! Fetch-on-mount page state.
//!
//! Pages start a request when they are shown and render whatever state the
//! request is in. Failures are shown, never retried automatically.

use std::fmt::Display;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Loadable<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Loadable::Ready(data),
            Err(e) => Loadable::Failed(e.to_string()),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Loadable::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Loadable::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            Loadable::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Mark as loading. Returns false if a fetch is already running.
    pub fn start(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        *self = Loadable::Loading;
        true
    }
}
