//! The session store: the single source of truth for "who is logged in".
//!
//! One `SessionStore` exists per running application. It is responsible
//! for:
//! - Running login/registration/logout operations against the provider
//! - Holding the current [`Session`] behind a watch channel
//! - Applying provider auth-state notifications in delivery order
//! - Minting bearer tokens for the *current* identity on demand
//!
//! # Concurrency note
//!
//! The session is the only mutable shared state in the client core. It
//! lives inside a `tokio::sync::watch` channel: the store's own
//! operations and the notification listener are the only writers, and
//! every consumer (guards, API client, UI) holds a cheap receiver that
//! observes changes reactively. Last write wins, which is exactly the
//! "last notification wins" ordering the provider contract requires.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{
    BearerToken, Identity, IdentityProvider, Session, SessionError,
};

/// The single source of truth for the current login.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ watch_provider() ──→ login_*() / register() ──→ logout()
///   │              │                     │
///   │              ▼                     ▼
///   │      [notifications applied]  [identity set]
///   ▼
/// { identity: None, is_loading: true }   (until the provider reports)
/// ```
///
/// Constructed once at application start; consumers receive it by
/// reference (an `Arc`), never as a global.
pub struct SessionStore<P: IdentityProvider> {
    /// The external identity service.
    provider: P,

    /// Current session state. The sender side lives here; consumers
    /// subscribe for receivers.
    state: watch::Sender<Session>,

    /// Counts session endings; see [`epoch`](Self::epoch).
    epoch: AtomicU64,
}

/// True when going from `old` to `new` ends the signed-in user's
/// session: the identity is cleared, or replaced by a different user.
fn session_ended(old: &Option<Identity>, new: &Option<Identity>) -> bool {
    match (old, new) {
        (Some(_), None) => true,
        (Some(old), Some(new)) => old.uid != new.uid,
        (None, _) => false,
    }
}

impl<P: IdentityProvider> SessionStore<P> {
    /// Creates the store in its initial state: nobody signed in,
    /// `is_loading` set until the provider's first notification.
    pub fn new(provider: P) -> Arc<Self> {
        let (state, _) = watch::channel(Session::default());
        Arc::new(Self {
            provider,
            state,
            epoch: AtomicU64::new(0),
        })
    }

    /// A monotonic counter that advances every time a session ends —
    /// the identity is cleared (logout, forced or not) or replaced by
    /// a different user.
    ///
    /// Anything caching per-session data compares epochs to find out
    /// whether its cache still belongs to the live session.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Relaxed)
    }

    /// Starts applying the provider's auth-state notifications.
    ///
    /// Spawns a listener task that consumes the provider's change
    /// stream and applies every notification — including the initial
    /// one — in delivery order. Each notification sets the identity and
    /// clears `is_loading`.
    ///
    /// The returned [`SubscriptionGuard`] owns the listener: dropping
    /// it releases the subscription. Hold it for as long as the session
    /// should stay live (the facade keeps it for the application's
    /// lifetime).
    pub fn watch_provider(self: &Arc<Self>) -> SubscriptionGuard {
        let store = Arc::clone(self);
        let mut notifications = self.provider.subscribe();

        let handle = tokio::spawn(async move {
            while let Some(identity) = notifications.recv().await {
                store.apply_notification(identity);
            }
            tracing::debug!("identity provider notification stream ended");
        });

        SubscriptionGuard { handle }
    }

    /// Applies one provider notification: new identity, loading settled.
    fn apply_notification(&self, identity: Option<Identity>) {
        match &identity {
            Some(id) => {
                tracing::info!(email = %id.email, "auth state: signed in");
            }
            None => tracing::info!("auth state: signed out"),
        }
        self.state.send_modify(|session| {
            if session_ended(&session.identity, &identity) {
                self.epoch.fetch_add(1, Ordering::Relaxed);
            }
            session.identity = identity;
            session.is_loading = false;
        });
    }

    /// Signs in with an email/password pair.
    ///
    /// Sets `is_loading` immediately. On success the identity is
    /// populated and loading cleared. On failure the provider error is
    /// returned unmodified and **loading is left set** — the initiating
    /// caller resets it with [`finish_loading`](Self::finish_loading)
    /// once it has shown the failure. Nothing is retried.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, SessionError> {
        self.state.send_modify(|session| session.is_loading = true);

        let identity =
            self.provider.sign_in_with_password(email, password).await?;

        self.settle(identity.clone());
        tracing::info!(email = %identity.email, "signed in with password");
        Ok(identity)
    }

    /// Signs in through the provider's federated popup flow.
    ///
    /// Same loading contract as
    /// [`login_with_password`](Self::login_with_password).
    pub async fn login_with_provider(
        &self,
    ) -> Result<Identity, SessionError> {
        self.state.send_modify(|session| session.is_loading = true);

        let identity = self.provider.sign_in_with_popup().await?;

        self.settle(identity.clone());
        tracing::info!(email = %identity.email, "signed in with provider popup");
        Ok(identity)
    }

    /// Creates a new provider account and signs it in.
    ///
    /// Creating the backend user profile afterwards is the caller's
    /// explicit follow-up call; this operation only establishes the
    /// identity. Same loading contract as the login operations.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, SessionError> {
        self.state.send_modify(|session| session.is_loading = true);

        let identity = self.provider.create_account(email, password).await?;

        self.settle(identity.clone());
        tracing::info!(email = %identity.email, "account registered");
        Ok(identity)
    }

    /// Signs out. Resolves once the provider confirms, then clears the
    /// identity.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.provider.sign_out().await?;

        self.clear_identity();
        tracing::info!("signed out");
        Ok(())
    }

    /// Forces the logged-out state without waiting for the provider.
    ///
    /// Used by the HTTP layer when the backend has already revoked
    /// authorization: the local session must reach the known-good
    /// logged-out state even when the provider is unreachable, so the
    /// identity is cleared first and the provider sign-out afterwards
    /// is best-effort.
    pub async fn force_logout(&self) {
        self.clear_identity();
        tracing::info!("session forced to signed out");

        if let Err(error) = self.provider.sign_out().await {
            tracing::warn!(
                %error,
                "provider sign-out failed during forced logout"
            );
        }
    }

    fn clear_identity(&self) {
        self.state.send_modify(|session| {
            if session_ended(&session.identity, &None) {
                self.epoch.fetch_add(1, Ordering::Relaxed);
            }
            session.identity = None;
            session.is_loading = false;
        });
    }

    /// Mints a fresh bearer token for the identity that is current *at
    /// call time*.
    ///
    /// Returns `Ok(None)` when nobody is signed in — the caller sends
    /// its request without an `Authorization` header. Reading the
    /// identity at mint time is what keeps a failed login from ever
    /// attaching a stale token.
    pub async fn mint_token(
        &self,
    ) -> Result<Option<BearerToken>, SessionError> {
        // Clone out of the watch borrow before awaiting.
        let identity = self.state.borrow().identity.clone();
        match identity {
            Some(identity) => {
                let token = self.provider.mint_token(&identity).await?;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    /// The current session value.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Subscribes to session changes. The receiver observes every
    /// update made by the store's operations and the notification
    /// listener.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Clears `is_loading` after a failed login/registration.
    ///
    /// The store leaves the flag set on failure (the caller owns the
    /// failure UX); this is the explicit reset.
    pub fn finish_loading(&self) {
        self.state.send_modify(|session| session.is_loading = false);
    }

    /// Settles the session on a successful login/registration.
    fn settle(&self, identity: Identity) {
        self.state.send_modify(|session| {
            let identity = Some(identity);
            if session_ended(&session.identity, &identity) {
                self.epoch.fetch_add(1, Ordering::Relaxed);
            }
            session.identity = identity;
            session.is_loading = false;
        });
    }
}

// ---------------------------------------------------------------------------
// SubscriptionGuard
// ---------------------------------------------------------------------------

/// RAII handle for the provider notification listener.
///
/// Dropping the guard aborts the listener task, guaranteeing the
/// subscription is released when the owning scope ends — cleanup cannot
/// be forgotten. `Drop` is synchronous, and `JoinHandle::abort` is too,
/// so no task needs to be spawned for teardown.
pub struct SubscriptionGuard {
    handle: JoinHandle<()>,
}

impl SubscriptionGuard {
    /// True once the listener has stopped (provider stream ended or the
    /// guard was aborted).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =========================================================================
// Tests
// =========================================================================
