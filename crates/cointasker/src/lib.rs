//! # CoinTasker client SDK
//!
//! The role-aware session and data-access core of the CoinTasker
//! micro-task marketplace client: workers complete tasks for coins,
//! buyers post tasks and review submissions, admins moderate and
//! approve withdrawals.
//!
//! This meta-crate wires the layers together behind one application
//! object:
//!
//! - [`cointasker_session`] — who is logged in, and the seam to the
//!   external identity provider
//! - [`cointasker_api`] — token-attaching HTTP clients with the
//!   session-expiry policy
//! - [`cointasker_roles`] — coalesced, cached role lookups
//! - [`cointasker_guards`] — route guard state machines
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use cointasker::prelude::*;
//!
//! # async fn run() -> Result<(), CoinTaskerError> {
//! let provider = InMemoryProvider::new(); // or your real provider
//! let app = CoinTaskerBuilder::new().build(provider);
//!
//! app.login_with_password("worker@example.com", "hunter2").await?;
//!
//! match app.check_route(RouteGuard::RoleRestricted(Role::Worker), "/worker/tasks").await {
//!     GuardOutcome::Allowed => { /* render the worker dashboard */ }
//!     GuardOutcome::Denied(target) => { /* navigate to target.path() */ }
//!     GuardOutcome::Pending => unreachable!("check_route settles"),
//! }
//! # Ok(())
//! # }
//! ```

mod app;
mod error;

pub use app::{CoinTasker, CoinTaskerBuilder, RouteGuard};
pub use error::CoinTaskerError;

/// Everything a consumer of the SDK typically needs in scope.
pub mod prelude {
    pub use cointasker_api::{
        ApiClient, ApiConfig, ApiError, PublicClient,
    };
    pub use cointasker_guards::{
        GuardOutcome, RedirectTarget, RoleStatus,
    };
    pub use cointasker_roles::{RoleResolution, RoleResolver};
    pub use cointasker_session::{
        BearerToken, Identity, IdentityProvider, InMemoryProvider,
        Session, SessionError, SessionStore,
    };
    pub use cointasker_types::{
        CoinBalance, Role, UserProfile, coin_value_usd,
    };

    pub use crate::{
        CoinTasker, CoinTaskerBuilder, CoinTaskerError, RouteGuard,
    };
}

/// Installs a process-wide `tracing` subscriber reading `RUST_LOG`,
/// defaulting to `info`. Safe to call more than once; later calls are
/// no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
