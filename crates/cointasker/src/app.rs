//! The `CoinTasker` application object: one wired instance of the
//! whole client core.
//!
//! Built once at application start, dropped at application end. The
//! constructor is the only place anything global-ish happens: the
//! session store is created, the provider subscription is spawned (and
//! owned, so teardown is guaranteed), and both HTTP clients plus the
//! role resolver are configured exactly once against it. Consumers
//! receive the object by reference — there are no module-level
//! singletons to fall out of sync.

use std::sync::Arc;

use cointasker_api::{ApiClient, ApiConfig, PublicClient};
use cointasker_guards::{
    GuardOutcome, RoleStatus, role_restricted, settle_anonymous_only,
    settle_authenticated_only,
};
use cointasker_roles::{RoleResolution, RoleResolver};
use cointasker_session::{
    Identity, IdentityProvider, Session, SessionStore, SubscriptionGuard,
};
use cointasker_types::{CoinBalance, Role};
use serde_json::json;
use tokio::sync::watch;

use crate::CoinTaskerError;

/// Coins credited to a fresh backend profile, by role. Workers start
/// with a small grant, buyers with enough to post a first task.
fn signup_coins(role: Role) -> i64 {
    match role {
        Role::Worker => 10,
        Role::Buyer => 50,
        Role::Admin => 0,
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and wiring a [`CoinTasker`] instance.
///
/// # Example
///
/// ```rust,no_run
/// use cointasker::prelude::*;
///
/// # fn run() -> Result<(), CoinTaskerError> {
/// let app = CoinTaskerBuilder::new()
///     .config(ApiConfig::from_env()?)
///     .build(InMemoryProvider::new());
/// # Ok(())
/// # }
/// ```
pub struct CoinTaskerBuilder {
    config: ApiConfig,
}

impl CoinTaskerBuilder {
    /// Creates a builder with the default (deployed) configuration.
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
        }
    }

    /// Overrides the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Wires everything against the given identity provider.
    ///
    /// Spawns the provider-notification listener, so this must run
    /// inside a Tokio runtime. The returned object owns the
    /// subscription; dropping it releases the listener.
    pub fn build<P: IdentityProvider>(self, provider: P) -> CoinTasker<P> {
        let session = SessionStore::new(provider);
        let subscription = session.watch_provider();

        let api = ApiClient::new(&self.config, Arc::clone(&session));
        let public = PublicClient::new(&self.config);
        let roles = RoleResolver::new(api.clone());

        tracing::info!(
            api_base = %self.config.api_base_url,
            public_base = %self.config.public_base_url,
            "CoinTasker client wired"
        );

        CoinTasker {
            session,
            api,
            public,
            roles,
            _subscription: subscription,
        }
    }
}

impl Default for CoinTaskerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// RouteGuard
// ---------------------------------------------------------------------------

/// Which gate to apply to a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    /// Any signed-in user.
    AuthenticatedOnly,
    /// Only while signed out (login/registration pages).
    AnonymousOnly,
    /// Signed in **and** holding exactly this role.
    RoleRestricted(Role),
}

// ---------------------------------------------------------------------------
// CoinTasker
// ---------------------------------------------------------------------------

/// One wired instance of the CoinTasker client core.
pub struct CoinTasker<P: IdentityProvider> {
    session: Arc<SessionStore<P>>,
    api: ApiClient<P>,
    public: PublicClient,
    roles: RoleResolver<P>,
    /// Owns the provider-notification listener; released on drop.
    _subscription: SubscriptionGuard,
}

impl<P: IdentityProvider> CoinTasker<P> {
    // -- Session operations ------------------------------------------------

    /// Signs in with an email/password pair.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, CoinTaskerError> {
        Ok(self.session.login_with_password(email, password).await?)
    }

    /// Signs in through the provider's federated popup flow.
    pub async fn login_with_provider(
        &self,
    ) -> Result<Identity, CoinTaskerError> {
        Ok(self.session.login_with_provider().await?)
    }

    /// Creates a provider account only. Use
    /// [`register_with_profile`](Self::register_with_profile) for the
    /// full sign-up flow including the backend profile.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, CoinTaskerError> {
        Ok(self.session.register(email, password).await?)
    }

    /// Full sign-up: creates the provider account, then creates the
    /// backend user profile with the role's starting coin grant.
    ///
    /// The two steps are explicitly sequenced here — the profile call
    /// goes out only after the provider account exists. The profile is
    /// created through the *public* client: the brand-new identity has
    /// no backend user yet, so the authenticated surface would reject
    /// it.
    pub async fn register_with_profile(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<Identity, CoinTaskerError> {
        let identity = self.session.register(email, password).await?;

        let body = json!({
            "name": name,
            "email": email,
            "photo_url": identity.photo_url,
            "role": role,
            "coin": signup_coins(role),
        });
        let _: serde_json::Value = self.public.post("users", &body).await?;

        tracing::info!(email, %role, "backend profile created");
        Ok(identity)
    }

    /// Signs out. Cached roles do not survive the session's end: the
    /// resolver drops its cache once the store's epoch moves on, which
    /// covers this logout and the forced one on 401/403 alike.
    pub async fn logout(&self) -> Result<(), CoinTaskerError> {
        Ok(self.session.logout().await?)
    }

    // -- State access ------------------------------------------------------

    /// The session store (read access; mutations go through the
    /// operations above).
    pub fn session(&self) -> &SessionStore<P> {
        &self.session
    }

    /// The current session value.
    pub fn snapshot(&self) -> Session {
        self.session.snapshot()
    }

    /// Subscribes to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// The authenticated HTTP client.
    pub fn api(&self) -> &ApiClient<P> {
        &self.api
    }

    /// The unauthenticated HTTP client for public endpoints.
    pub fn public_api(&self) -> &PublicClient {
        &self.public
    }

    // -- Roles and guards --------------------------------------------------

    /// Resolves the current identity's role. `None` when nobody is
    /// signed in (the resolver is disabled without an email to key on).
    pub async fn resolve_role(&self) -> Option<RoleResolution> {
        let email = self.session.snapshot().identity.map(|i| i.email)?;
        Some(self.roles.resolve(&email).await)
    }

    /// Evaluates a route guard for a navigation, waiting out any
    /// pending state.
    ///
    /// Settles the session first (initial handshake, in-flight login),
    /// then — for [`RouteGuard::RoleRestricted`] — resolves the role
    /// and re-checks the session, settling again if it changed during
    /// the lookup. Never returns [`GuardOutcome::Pending`] under a
    /// live session store.
    pub async fn check_route(
        &self,
        guard: RouteGuard,
        attempted_path: &str,
    ) -> GuardOutcome {
        let mut rx = self.session.subscribe();

        match guard {
            RouteGuard::AuthenticatedOnly => {
                settle_authenticated_only(&mut rx, attempted_path).await
            }
            RouteGuard::AnonymousOnly => {
                settle_anonymous_only(&mut rx).await
            }
            RouteGuard::RoleRestricted(required) => loop {
                match settle_authenticated_only(&mut rx, attempted_path)
                    .await
                {
                    GuardOutcome::Allowed => {}
                    denied => return denied,
                }

                let Some(identity) = rx.borrow().identity.clone() else {
                    // A logout raced the settlement; settle again.
                    continue;
                };

                let resolution =
                    self.roles.resolve(&identity.email).await;
                // Evaluate against the session as it stands *after*
                // the lookup; a flap back to loading loops into
                // settlement instead of leaking Pending out.
                let session = rx.borrow().clone();
                let outcome = role_restricted(
                    &session,
                    RoleStatus::Settled(resolution),
                    required,
                    attempted_path,
                );
                if !outcome.is_pending() {
                    return outcome;
                }
            },
        }
    }

    /// Fetches the signed-in user's coin balance. `None` when signed
    /// out.
    pub async fn my_coin(
        &self,
    ) -> Result<Option<CoinBalance>, CoinTaskerError> {
        let Some(identity) = self.session.snapshot().identity else {
            return Ok(None);
        };
        let balance = self.api.get_coin(&identity.email).await?;
        Ok(Some(balance))
    }
}
