//! REST API client for the district administration backend.
//!
//! The backend issues JWT bearer tokens from `/auth/login`. Every
//! authenticated call attaches the persisted token through the shared
//! `ResponsePolicy`, which also turns a 401 from any endpoint into a
//! forced logout.

pub mod analytics;
pub mod auth;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod policy;
pub mod tasks;

pub use client::{ApiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::ApiError;
pub use policy::{AuthScope, ResponsePolicy, UnauthorizedObserver};
