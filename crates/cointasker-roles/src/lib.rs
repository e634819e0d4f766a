//! Role resolution for the CoinTasker client.
//!
//! Answers "what is this identity's role?" with the backend as the
//! source of truth, while making sure the question is asked at most
//! once per email:
//!
//! - One backend lookup per distinct email, cached for the session.
//! - Concurrent callers for the same email coalesce onto the one
//!   in-flight lookup.
//! - "No such user" and "lookup failed" are **explicit terminal
//!   states** — a guard waiting on a role always gets an answer, never
//!   a spinner that spins forever.
//!
//! # How it fits in the stack
//!
//! ```text
//! Guards / Facade (above)  ← deny or allow based on the resolution
//!     ↕
//! Role layer (this crate)  ← cache + coalescing
//!     ↕
//! API layer (below)        ← GET /users/{email}
//! ```

mod resolver;

pub use resolver::{RoleResolution, RoleResolver};
