//! Persisted credential storage.
//!
//! The only client state that survives a restart is the bearer token,
//! stored under the fixed key `token`. Three backends implement
//! `CredentialStore`:
//! - `FileCredentialStore`: JSON file in the data directory
//! - `KeyringCredentialStore`: OS keychain via keyring
//! - `MemoryCredentialStore`: process-local, nothing persisted

pub mod credentials;

pub use credentials::{
    CredentialError, CredentialStore, FileCredentialStore, KeyringCredentialStore,
    MemoryCredentialStore, TOKEN_KEY,
};
