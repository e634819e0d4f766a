//! HTTP clients for the CoinTasker backend.
//!
//! Two clients, one policy decision apart:
//!
//! 1. **[`ApiClient`]** — for endpoints behind the authenticated base
//!    URL. Mints a fresh bearer token per request (if anyone is signed
//!    in) and enforces the session-expiry policy: any 401/403 forces a
//!    logout through the session store before the error reaches the
//!    caller.
//! 2. **[`PublicClient`]** — for public endpoints (registration, open
//!    listings). Never attaches a token, never touches the session.
//!
//! Both are built **once** at application start with a reference to the
//! session store — there is no per-consumer interceptor registration,
//! so duplicate-handler bugs cannot exist by construction.
//!
//! # How it fits in the stack
//!
//! ```text
//! Roles / Facade (above)   ← issue typed requests
//!     ↕
//! API layer (this crate)   ← authorization, expiry policy, decoding
//!     ↕
//! Session layer (below)    ← current identity, token minting, logout
//! ```

mod client;
mod config;
mod error;

pub use client::{ApiClient, PublicClient};
pub use config::{
    ApiConfig, DEFAULT_API_BASE_URL, DEFAULT_PUBLIC_BASE_URL,
};
pub use error::ApiError;
