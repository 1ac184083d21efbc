use thiserror::Error;

/// Reasons a presented session token is rejected.
///
/// Callers treat every variant as "unauthenticated". The distinction exists
/// for logging and tests, not for clients.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token is malformed")]
    MalformedToken,

    #[error("Token signature does not match")]
    BadSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is not yet valid")]
    NotYetValid,
}

/// Error type for token issuance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IssueError {
    #[error("Token subject must not be empty")]
    EmptySubject,

    #[error("Token lifetime must be positive and representable, got {0} seconds")]
    InvalidTtl(i64),

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}
