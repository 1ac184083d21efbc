use thiserror::Error;

/// Error type for password credential operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Malformed credential: {0}")]
    MalformedCredential(String),
}
