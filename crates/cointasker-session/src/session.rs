//! Session types: the data structures that represent the current login.
//!
//! A "session" is the client's in-memory record of the authenticated
//! user. It tracks:
//! - WHO is signed in (`Identity`, or `None` when logged out)
//! - WHETHER an answer is still pending (`is_loading`)

use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The authenticated user record issued by the external identity provider.
///
/// This is the subset of the provider record the client consumes. Token
/// minting is deliberately *not* a method here — tokens are short-lived
/// and minted on demand through
/// [`IdentityProvider::mint_token`](crate::IdentityProvider::mint_token),
/// so the identity itself stays a plain value that is cheap to clone into
/// the session watch channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-assigned unique id.
    pub uid: String,
    /// Unique email, also the key the backend looks users up by.
    pub email: String,
    /// Display name, if the provider has one.
    pub display_name: Option<String>,
    /// Avatar URL, if the provider has one.
    pub photo_url: Option<String>,
}

// ---------------------------------------------------------------------------
// BearerToken
// ---------------------------------------------------------------------------

/// A short-lived credential minted per request to prove identity to the
/// backend.
///
/// Newtype over the raw token string so a token can't be confused with
/// any other string in a signature. `Debug` is implemented by hand to
/// keep the secret out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building an `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The in-memory representation of the current login.
///
/// Invariant: `is_loading` is true only during the initial provider
/// handshake or while a login/registration call is in flight. The store
/// starts at `{ identity: None, is_loading: true }` and the first
/// provider notification settles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user, or `None` when logged out.
    pub identity: Option<Identity>,
    /// Whether the session is still being determined.
    pub is_loading: bool,
}

impl Session {
    /// True when the session has settled with a signed-in user.
    pub fn is_authenticated(&self) -> bool {
        !self.is_loading && self.identity.is_some()
    }
}

impl Default for Session {
    /// The state before the provider has reported anything: nobody is
    /// signed in *yet*, and we don't know whether they will be.
    fn default() -> Self {
        Self {
            identity: None,
            is_loading: true,
        }
    }
}
