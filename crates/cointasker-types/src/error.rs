//! Error types for the shared domain vocabulary.

/// Errors produced when parsing domain values from their wire form.
#[derive(Debug, thiserror::Error)]
pub enum RoleParseError {
    /// The string is not one of the three known roles.
    /// Roles are assigned by the backend; an unknown value usually means
    /// a client/backend version mismatch.
    #[error("unknown role: {0:?} (expected worker, buyer or admin)")]
    Unknown(String),
}
