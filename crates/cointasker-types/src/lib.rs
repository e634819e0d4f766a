//! Shared domain types for the CoinTasker client.
//!
//! Everything in this crate crosses the boundary between the marketplace
//! backend and the client layers above it: user roles, profile records,
//! coin balances, and the coin/dollar conversion used for display math.
//!
//! # How it fits in the stack
//!
//! ```text
//! Guards / Facade (above)   ← decide access based on Role
//!     ↕
//! API / Roles (middle)      ← deserialize UserProfile, CoinBalance
//!     ↕
//! Types (this crate)        ← the shared vocabulary
//! ```

mod error;
mod types;

pub use error::RoleParseError;
pub use types::{
    CoinBalance, Role, UserProfile, COINS_PER_DOLLAR, coin_value_usd,
};
