//! Unified error type for the CoinTasker SDK.

use cointasker_api::ApiError;
use cointasker_session::SessionError;

/// Top-level error that wraps the layer-specific errors.
///
/// Consumers of the `cointasker` meta-crate deal with this single type;
/// `#[from]` lets `?` convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CoinTaskerError {
    /// An identity-provider error (credentials, popup, sign-out,
    /// token minting).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An HTTP-layer error (authorization, status, transport,
    /// decoding).
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_session_error() {
        let err = SessionError::FlowCancelled;
        let top: CoinTaskerError = err.into();
        assert!(matches!(top, CoinTaskerError::Session(_)));
        assert!(top.to_string().contains("cancelled"));
    }

    #[test]
    fn test_from_api_error() {
        let err = ApiError::Unauthorized { status: 401 };
        let top: CoinTaskerError = err.into();
        assert!(matches!(top, CoinTaskerError::Api(_)));
    }
}
