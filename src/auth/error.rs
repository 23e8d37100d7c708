//! Authentication failure kinds.

use thiserror::Error;

/// Why a request could not be authenticated.
///
/// The display text is sent to the caller verbatim, so variants never carry
/// verification internals (which key, which check, which byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Signature, algorithm, encoding or structure did not verify.
    #[error("Invalid or malformed token")]
    BadSignature,

    #[error("Token has expired")]
    Expired,

    /// Neither the identity claim nor `sub` is present.
    #[error("Token does not identify a caller")]
    MissingIdentity,

    /// No `Authorization` header, or not a `Bearer` credential.
    #[error("Missing or invalid Authorization header")]
    MalformedHeader,
}

impl AuthError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired => "expired",
            AuthError::MissingIdentity => "missing_identity",
            AuthError::MalformedHeader => "malformed_header",
        }
    }
}
