//! Core library for civicdesk.
//!
//! This crate contains everything that does not depend on a terminal:
//!
//! - `api`: REST client for the district administration backend, including
//!   the shared response policy that attaches bearer tokens and turns a 401
//!   into a forced logout
//! - `auth`: persisted credential (bearer token) storage
//! - `session`: the session store, identity collaborator and route guard
//! - `routes`: the route table and navigation resolution
//! - `models`: users, tasks, dashboard and analytics payloads
//! - `config`: on-disk configuration
//! - `fetch`: fetch-on-mount page state

pub mod api;
pub mod auth;
pub mod config;
pub mod fetch;
pub mod models;
pub mod routes;
pub mod session;
pub mod utils;
