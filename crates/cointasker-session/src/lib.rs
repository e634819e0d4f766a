//! Session management for the CoinTasker client.
//!
//! This crate is the single source of truth for "who is logged in":
//!
//! 1. **Identity seam** — validating who a user is against the external
//!    identity service ([`IdentityProvider`] trait)
//! 2. **Session state** — the current identity plus its loading flag
//!    ([`Session`], held by [`SessionStore`])
//! 3. **Change subscription** — applying provider auth-state
//!    notifications in delivery order, released via RAII
//!    ([`SubscriptionGuard`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Guards / Facade (above)   ← read the session to gate routes
//!     ↕
//! API client (above)        ← mints a bearer token per request
//!     ↕
//! Session layer (this crate) ← owns the identity and its lifecycle
//!     ↕
//! Identity provider (external) ← Firebase-style auth service
//! ```
//!
//! There is exactly one [`SessionStore`] per running application. The
//! store exclusively owns the identity; the API client and role resolver
//! only read it (the API client may *trigger* a logout through the
//! store's public operation, never by mutating state directly).

mod error;
mod memory;
mod provider;
mod session;
mod store;

pub use error::SessionError;
pub use memory::InMemoryProvider;
pub use provider::IdentityProvider;
pub use session::{BearerToken, Identity, Session};
pub use store::{SessionStore, SubscriptionGuard};
