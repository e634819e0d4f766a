//! An in-memory identity provider for development and tests.
//!
//! Behaves like the real identity service from the session layer's
//! point of view: accounts, password checks, a federated-popup stand-in,
//! ordered auth-state notifications with initial-value delivery, and
//! per-call token minting. All of it lives in process memory.
//!
//! Never use this in production — passwords are stored in plain text
//! and tokens are not verified by anything.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::Rng;
use tokio::sync::mpsc;

use crate::{BearerToken, Identity, IdentityProvider, SessionError};

/// One registered account.
struct Account {
    password: String,
    identity: Identity,
}

struct Inner {
    /// Registered accounts, keyed by email.
    accounts: HashMap<String, Account>,
    /// Who is currently signed in, provider-side.
    current: Option<Identity>,
    /// Active auth-state subscriptions. Closed receivers are pruned on
    /// the next broadcast.
    watchers: Vec<mpsc::UnboundedSender<Option<Identity>>>,
    /// What the federated popup flow yields. `None` models the user
    /// closing the popup.
    popup_identity: Option<Identity>,
    /// When set, every sign-out fails with this reason.
    sign_out_error: Option<String>,
    /// Monotonic counter for provider uids.
    next_uid: u64,
}

/// In-memory [`IdentityProvider`].
///
/// Cheap to clone — clones share the same provider state, like multiple
/// handles to one auth service.
#[derive(Clone)]
pub struct InMemoryProvider {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryProvider {
    /// Creates an empty provider: no accounts, nobody signed in.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                accounts: HashMap::new(),
                current: None,
                watchers: Vec::new(),
                popup_identity: None,
                sign_out_error: None,
                next_uid: 1,
            })),
        }
    }

    /// Registers an account without signing it in. Test/dev setup.
    pub fn seed_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) {
        let mut inner = self.lock();
        let identity = Self::make_identity(
            &mut inner,
            email,
            display_name.map(str::to_string),
        );
        inner.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity,
            },
        );
    }

    /// Configures what the federated popup flow returns. Without this,
    /// [`sign_in_with_popup`](IdentityProvider::sign_in_with_popup)
    /// behaves as if the user closed the popup.
    pub fn set_popup_identity(&self, identity: Identity) {
        self.lock().popup_identity = Some(identity);
    }

    /// Makes every subsequent sign-out fail with the given reason,
    /// modeling an unreachable provider.
    pub fn fail_sign_out(&self, reason: &str) {
        self.lock().sign_out_error = Some(reason.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning only happens if a holder panicked; dev/test
        // provider, so inherit the panic.
        self.inner.lock().expect("provider state poisoned")
    }

    fn make_identity(
        inner: &mut Inner,
        email: &str,
        display_name: Option<String>,
    ) -> Identity {
        let uid = format!("uid-{}", inner.next_uid);
        inner.next_uid += 1;
        Identity {
            uid,
            email: email.to_string(),
            display_name,
            photo_url: None,
        }
    }

    /// Records the new current identity and notifies every live
    /// subscriber, in subscription order.
    fn set_current(inner: &mut Inner, identity: Option<Identity>) {
        inner.current = identity.clone();
        inner
            .watchers
            .retain(|watcher| watcher.send(identity.clone()).is_ok());
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for InMemoryProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, SessionError> {
        let mut inner = self.lock();

        let identity = match inner.accounts.get(email) {
            Some(account) if account.password == password => {
                account.identity.clone()
            }
            // Unknown email and wrong password are indistinguishable,
            // matching real providers.
            _ => {
                return Err(SessionError::InvalidCredentials {
                    email: email.to_string(),
                });
            }
        };

        Self::set_current(&mut inner, Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in_with_popup(&self) -> Result<Identity, SessionError> {
        let mut inner = self.lock();

        let Some(identity) = inner.popup_identity.clone() else {
            return Err(SessionError::FlowCancelled);
        };

        Self::set_current(&mut inner, Some(identity.clone()));
        Ok(identity)
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, SessionError> {
        let mut inner = self.lock();

        if inner.accounts.contains_key(email) {
            return Err(SessionError::AccountExists {
                email: email.to_string(),
            });
        }

        let identity = Self::make_identity(&mut inner, email, None);
        inner.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        Self::set_current(&mut inner, Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        let mut inner = self.lock();
        if let Some(reason) = inner.sign_out_error.clone() {
            return Err(SessionError::ProviderUnavailable(reason));
        }
        Self::set_current(&mut inner, None);
        Ok(())
    }

    async fn mint_token(
        &self,
        identity: &Identity,
    ) -> Result<BearerToken, SessionError> {
        let inner = self.lock();

        // Tokens are only minted for the provider-side current user.
        // A stale identity (revoked elsewhere) gets refused, as the
        // real service would refuse a force-refresh.
        match &inner.current {
            Some(current) if current.uid == identity.uid => {
                Ok(BearerToken::new(generate_token()))
            }
            _ => Err(SessionError::TokenMint(format!(
                "no active provider session for {}",
                identity.email
            ))),
        }
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<Option<Identity>> {
        let mut inner = self.lock();
        let (tx, rx) = mpsc::unbounded_channel();
        // Initial notification: the current value at subscription time.
        let _ = tx.send(inner.current.clone());
        inner.watchers.push(tx);
        rx
    }
}

/// Generates a random 32-character hex string (128 bits of entropy),
/// the shape of a short-lived bearer token.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
