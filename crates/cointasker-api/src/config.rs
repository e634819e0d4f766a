//! API configuration: where the backend lives.
//!
//! Two base URLs, one per client: public endpoints and authenticated
//! endpoints are allowed to live on different hosts (they usually
//! don't). Both default to the hosted backend and can be overridden via
//! environment variables, so no build can ship with one client pointed
//! at a loopback address while the other talks to production.

use url::Url;

use crate::ApiError;

/// Default base URL for unauthenticated requests.
pub const DEFAULT_PUBLIC_BASE_URL: &str =
    "https://api.cointasker.app/";

/// Default base URL for authenticated requests.
pub const DEFAULT_API_BASE_URL: &str = "https://api.cointasker.app/";

/// Environment variable overriding [`DEFAULT_PUBLIC_BASE_URL`].
pub(crate) const PUBLIC_URL_VAR: &str = "COINTASKER_PUBLIC_URL";

/// Environment variable overriding [`DEFAULT_API_BASE_URL`].
pub(crate) const API_URL_VAR: &str = "COINTASKER_API_URL";

/// Where the two HTTP clients point.
///
/// Construct with [`ApiConfig::new`] (validated) or grab the deployed
/// defaults with `ApiConfig::default()` and override what you need.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for the unauthenticated [`PublicClient`](crate::PublicClient).
    pub public_base_url: Url,
    /// Base URL for the authenticated [`ApiClient`](crate::ApiClient).
    pub api_base_url: Url,
}

impl ApiConfig {
    /// Parses and validates the two base URLs.
    ///
    /// Base URLs are normalized to end with `/` so that joining a
    /// relative endpoint path keeps every base path segment.
    ///
    /// # Errors
    /// [`ApiError::Url`] when either string is not a valid URL.
    pub fn new(
        public_base_url: &str,
        api_base_url: &str,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            public_base_url: parse_base(public_base_url)?,
            api_base_url: parse_base(api_base_url)?,
        })
    }

    /// Reads the config from the environment, falling back to the
    /// deployed defaults for anything unset.
    ///
    /// # Errors
    /// [`ApiError::Url`] when an override is not a valid URL.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// `from_env` with an injectable variable source, so the precedence
    /// logic is testable without touching process globals.
    fn from_lookup(
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ApiError> {
        let public = get(PUBLIC_URL_VAR)
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string());
        let api = get(API_URL_VAR)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Self::new(&public, &api)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        // The literals above are compile-time constants; parsing them
        // cannot fail.
        Self::new(DEFAULT_PUBLIC_BASE_URL, DEFAULT_API_BASE_URL)
            .expect("default base URLs are valid")
    }
}

/// Parses a base URL and guarantees a trailing slash on its path.
fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}

// =========================================================================
// Tests
// =========================================================================
