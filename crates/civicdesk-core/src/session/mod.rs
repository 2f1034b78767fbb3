//! Session lifecycle: who is logged in, how that is established and
//! what protected screens may show.

pub mod error;
pub mod guard;
pub mod identity;
mod state;
pub mod store;

pub use error::SessionError;
pub use guard::{evaluate, guard, GuardDecision, Guarded};
pub use identity::IdentityProvider;
pub use state::{Phase, Session};
pub use store::SessionStore;
