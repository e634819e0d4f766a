//! The identity-provider seam.
//!
//! CoinTasker doesn't implement authentication itself — the external
//! identity service does (Firebase Authentication in the deployed app).
//! This module defines the [`IdentityProvider`] trait: the handful of
//! operations the session layer needs from such a service.
//!
//! # Why a trait?
//!
//! - Production binds it to the real identity service.
//! - Development and tests use [`InMemoryProvider`](crate::InMemoryProvider).
//!
//! The [`SessionStore`](crate::SessionStore) works against either
//! without changing.

use std::future::Future;

use tokio::sync::mpsc;

use crate::{BearerToken, Identity, SessionError};

/// Operations the session layer requires from an external identity
/// provider.
///
/// # Trait bounds
///
/// - `Send + Sync` → the provider is shared across async tasks.
/// - `'static` → it doesn't borrow temporary data; it lives as long as
///   the application.
///
/// Methods return `impl Future + Send` (rather than plain `async fn`)
/// so callers can hold the futures across task boundaries.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Signs in with an email/password pair.
    ///
    /// # Errors
    /// [`SessionError::InvalidCredentials`] when the pair is rejected,
    /// [`SessionError::ProviderUnavailable`] on transport failure.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, SessionError>> + Send;

    /// Signs in through the provider's federated popup/redirect flow
    /// (Google sign-in and the like).
    ///
    /// # Errors
    /// [`SessionError::FlowCancelled`] when the user abandons the flow.
    fn sign_in_with_popup(
        &self,
    ) -> impl Future<Output = Result<Identity, SessionError>> + Send;

    /// Creates a new account and signs it in.
    ///
    /// This creates the *provider* record only. Creating the backend
    /// user profile is the caller's follow-up (an explicit sequencing
    /// the caller owns, not this layer).
    ///
    /// # Errors
    /// [`SessionError::AccountExists`] when the email is taken.
    fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, SessionError>> + Send;

    /// Signs the current user out. Resolves once the provider confirms.
    fn sign_out(
        &self,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Mints a fresh short-lived bearer token for the given identity.
    ///
    /// Called once per outgoing authenticated request, so tokens are
    /// always current. May force-refresh on the provider side.
    ///
    /// # Errors
    /// [`SessionError::TokenMint`] when the provider-side session no
    /// longer exists for this identity.
    fn mint_token(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<BearerToken, SessionError>> + Send;

    /// Subscribes to auth-state change notifications.
    ///
    /// The returned channel yields the new identity (or `None` on
    /// sign-out) for every change, **in the order the provider emits
    /// them**, starting with the current value at subscription time.
    /// Dropping the receiver ends the subscription.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<Option<Identity>>;
}
