//! Error types for the session layer.

/// Errors that can occur while talking to the identity provider.
///
/// These cover the full lifecycle of a login: credential sign-in,
/// federated sign-in, account creation, sign-out, and token minting.
/// None of them is retried automatically — the initiating caller (a
/// login form, usually) decides what to do.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The provider rejected the email/password combination.
    #[error("invalid credentials for {email}")]
    InvalidCredentials {
        /// The email that failed to sign in.
        email: String,
    },

    /// An account already exists for this email; registration refused.
    #[error("an account already exists for {email}")]
    AccountExists {
        /// The email that was being registered.
        email: String,
    },

    /// The federated sign-in flow was abandoned before completing
    /// (the user closed the provider's popup, typically).
    #[error("sign-in flow was cancelled before completing")]
    FlowCancelled,

    /// The provider could not be reached at all.
    #[error("identity provider unreachable: {0}")]
    ProviderUnavailable(String),

    /// The provider refused to mint a token for the identity — usually
    /// because the provider-side session has already been revoked.
    #[error("token minting failed: {0}")]
    TokenMint(String),
}
