//! The role resolver: a per-email cache over the backend role lookup.

use std::collections::HashMap;
use std::sync::Arc;

use cointasker_api::{ApiClient, ApiError};
use cointasker_session::IdentityProvider;
use cointasker_types::Role;
use tokio::sync::{Mutex, OnceCell};

// ---------------------------------------------------------------------------
// RoleResolution
// ---------------------------------------------------------------------------

/// The settled answer to "what is this email's role?".
///
/// Every variant is terminal — guards can always make a decision:
///
/// - **Resolved** — the backend knows the user and their role.
/// - **Absent** — the backend has no user for this email. A valid end
///   state (a provider account can exist before its backend profile
///   does), not an error.
/// - **Failed** — the lookup errored; the role is unknown. Guards
///   treat this conservatively and deny role-gated subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleResolution {
    /// The backend returned a profile with this role.
    Resolved(Role),
    /// The backend has no matching user (HTTP 404).
    Absent,
    /// The lookup failed; role unknown.
    Failed,
}

// ---------------------------------------------------------------------------
// RoleResolver
// ---------------------------------------------------------------------------

/// Resolves roles through the backend with a per-email cache.
///
/// Each email maps to a `OnceCell`: the first caller runs the lookup,
/// concurrent callers for the same email wait on the same cell, and
/// everyone observes one result — exactly one network call per distinct
/// email.
///
/// `Resolved` and `Absent` are cached for the session: the cache
/// remembers the session store's [epoch](
/// cointasker_session::SessionStore::epoch) and drops itself whenever
/// the session has ended since the entries were made — a logout (forced
/// or not) never leaks roles into the next login. A failed lookup
/// leaves its cell empty, so a later call may retry instead of freezing
/// a transient network error into the session; callers queued behind
/// the failed attempt retry in turn and all settle to
/// [`RoleResolution::Failed`] while the backend stays unreachable.
pub struct RoleResolver<P: IdentityProvider> {
    api: ApiClient<P>,
    cache: Mutex<RoleCache>,
}

/// The cells plus the session epoch they belong to.
struct RoleCache {
    epoch: u64,
    cells: HashMap<String, Arc<OnceCell<RoleResolution>>>,
}

impl<P: IdentityProvider> RoleResolver<P> {
    /// Creates an empty resolver over the authenticated API client.
    pub fn new(api: ApiClient<P>) -> Self {
        let epoch = api.session().epoch();
        Self {
            api,
            cache: Mutex::new(RoleCache {
                epoch,
                cells: HashMap::new(),
            }),
        }
    }

    /// Resolves the role for `email`, from cache when possible.
    ///
    /// Never returns an error and never hangs: failures settle to
    /// [`RoleResolution::Failed`] (logged at `warn`), missing users to
    /// [`RoleResolution::Absent`].
    pub async fn resolve(&self, email: &str) -> RoleResolution {
        let cell = {
            // Lock only to find or create the cell; the lookup itself
            // runs outside the cache lock so distinct emails resolve
            // concurrently.
            let mut cache = self.cache.lock().await;
            let epoch = self.api.session().epoch();
            if cache.epoch != epoch {
                // The session the cached roles belonged to has ended.
                cache.cells.clear();
                cache.epoch = epoch;
            }
            Arc::clone(cache.cells.entry(email.to_string()).or_default())
        };

        let result = cell
            .get_or_try_init(|| async {
                match self.api.get_user(email).await {
                    Ok(profile) => {
                        tracing::debug!(
                            email,
                            role = %profile.role,
                            "role resolved"
                        );
                        Ok(RoleResolution::Resolved(profile.role))
                    }
                    Err(ApiError::Status { status: 404, .. }) => {
                        tracing::debug!(
                            email,
                            "no backend user, role is absent"
                        );
                        Ok(RoleResolution::Absent)
                    }
                    Err(error) => Err(error),
                }
            })
            .await;

        match result {
            Ok(resolution) => *resolution,
            Err(error) => {
                tracing::warn!(email, %error, "role lookup failed");
                RoleResolution::Failed
            }
        }
    }

    /// Drops the cached resolution for one email. The next `resolve`
    /// call refetches.
    pub async fn invalidate(&self, email: &str) {
        self.cache.lock().await.cells.remove(email);
    }

    /// Drops every cached resolution. Session endings are handled
    /// automatically through the epoch; this is for explicit refreshes
    /// (a role change applied by an admin, say).
    pub async fn clear(&self) {
        self.cache.lock().await.cells.clear();
    }
}

// =========================================================================
// Tests
// =========================================================================
