//! The two HTTP clients: authenticated and public.

use std::sync::Arc;

use cointasker_session::{IdentityProvider, SessionStore};
use cointasker_types::{CoinBalance, UserProfile};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{ApiConfig, ApiError};

// ---------------------------------------------------------------------------
// ApiClient — authenticated
// ---------------------------------------------------------------------------

/// HTTP client for endpoints behind the authenticated base URL.
///
/// Per request:
/// 1. If an identity is present **at send time**, a fresh bearer token
///    is minted through the session store and attached as
///    `Authorization: Bearer <token>`. Absent identity means a bare
///    request — a login that failed moments ago can never leave a stale
///    token behind.
/// 2. A 401/403 response forces a logout on the session store exactly
///    once, then surfaces as [`ApiError::Unauthorized`]. The session
///    transition is what route guards react to — every authenticated
///    subtree re-evaluates to a login redirect.
/// 3. Everything else passes through unchanged.
///
/// Constructed once at startup with a reference to the session store.
/// Cloning is cheap (the underlying connection pool is shared).
pub struct ApiClient<P: IdentityProvider> {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore<P>>,
}

impl<P: IdentityProvider> Clone for ApiClient<P> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            session: Arc::clone(&self.session),
        }
    }
}

impl<P: IdentityProvider> ApiClient<P> {
    /// Builds the authenticated client against
    /// [`ApiConfig::api_base_url`].
    pub fn new(config: &ApiConfig, session: Arc<SessionStore<P>>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            session,
        }
    }

    /// `GET {base}/{path}`, decoding a JSON body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.http.get(url)).await?;
        read_json(response).await
    }

    /// `POST {base}/{path}` with a JSON body, decoding a JSON response.
    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self.send(self.http.post(url).json(body)).await?;
        read_json(response).await
    }

    /// `PATCH {base}/{path}` with a JSON body, decoding a JSON response.
    pub async fn patch<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self.send(self.http.patch(url).json(body)).await?;
        read_json(response).await
    }

    /// `DELETE {base}/{path}`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.http.delete(url)).await?;
        expect_success(response).await.map(|_| ())
    }

    /// The session store this client attaches tokens from.
    pub fn session(&self) -> &Arc<SessionStore<P>> {
        &self.session
    }

    /// Fetches the backend user record: `GET /users/{email}`.
    ///
    /// The profile carries the user's role — this is the lookup the
    /// role resolver coalesces.
    pub async fn get_user(
        &self,
        email: &str,
    ) -> Result<UserProfile, ApiError> {
        let url = self.user_url(email, None)?;
        let response = self.send(self.http.get(url)).await?;
        read_json(response).await
    }

    /// Fetches the current coin balance: `GET /users/{email}/coin`.
    pub async fn get_coin(
        &self,
        email: &str,
    ) -> Result<CoinBalance, ApiError> {
        let url = self.user_url(email, Some("coin"))?;
        let response = self.send(self.http.get(url)).await?;
        read_json(response).await
    }

    /// Joins a relative endpoint path onto the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    /// Builds `/users/{email}[/{tail}]` with the email as a proper path
    /// segment, so unusual characters are percent-encoded rather than
    /// reinterpreted.
    fn user_url(
        &self,
        email: &str,
        tail: Option<&str>,
    ) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ApiError::InvalidBaseUrl(self.base_url.clone())
            })?;
            segments.pop_if_empty().push("users").push(email);
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        Ok(url)
    }

    /// Attaches authorization and enforces the session-expiry policy.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, ApiError> {
        // Token attachment is decided here, at send time, against the
        // identity that is current *now*.
        let request = match self.session.mint_token().await? {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        };

        let response = request.send().await.map_err(ApiError::Network)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
        {
            tracing::warn!(
                status = status.as_u16(),
                "backend rejected authorization, forcing logout"
            );
            // One forced logout per rejecting response; the local
            // state reaches signed-out even if the provider is down.
            // The original error still reaches the caller below.
            self.session.force_logout().await;
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// PublicClient — unauthenticated
// ---------------------------------------------------------------------------

/// HTTP client for public endpoints (registration, open listings).
///
/// Never attaches a token and never touches the session — a 401 from a
/// public endpoint is an ordinary [`ApiError::Status`], not a forced
/// logout.
#[derive(Clone)]
pub struct PublicClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PublicClient {
    /// Builds the public client against
    /// [`ApiConfig::public_base_url`].
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.public_base_url.clone(),
        }
    }

    /// `GET {base}/{path}`, decoding a JSON body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        let url = self.base_url.join(path)?;
        let response =
            self.http.get(url).send().await.map_err(ApiError::Network)?;
        read_json(response).await
    }

    /// `POST {base}/{path}` with a JSON body, decoding a JSON response.
    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::Network)?;
        read_json(response).await
    }
}

// ---------------------------------------------------------------------------
// Response handling shared by both clients
// ---------------------------------------------------------------------------

/// Maps any non-success status to [`ApiError::Status`], carrying as
/// much of the body as could be read.
async fn expect_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// [`expect_success`], then decode the JSON body.
async fn read_json<T: DeserializeOwned>(
    response: Response,
) -> Result<T, ApiError> {
    let response = expect_success(response).await?;
    response.json().await.map_err(ApiError::Decode)
}

// =========================================================================
// Tests
// =========================================================================
