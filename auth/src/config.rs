use std::fmt;

use chrono::Duration;
use secrecy::ExposeSecret;
use secrecy::SecretVec;
use thiserror::Error;

use crate::password::DEFAULT_ITERATIONS;

/// Default lifetime of an issued session token.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60;

/// Error type for authentication configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthConfigError {
    #[error("Server secret must not be empty")]
    EmptySecret,

    #[error("Password iteration count must be at least 1")]
    InvalidIterations,

    #[error("Token lifetime must be positive, got {0} seconds")]
    InvalidTokenTtl(i64),
}

/// Process-wide signing key.
///
/// Loaded once at startup and never mutated afterwards. The bytes are kept
/// behind `secrecy` so they never show up in `Debug` output or logs.
pub struct ServerSecret(SecretVec<u8>);

impl ServerSecret {
    /// Wrap raw key material.
    ///
    /// # Errors
    /// * `EmptySecret` - No key material was provided
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, AuthConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(AuthConfigError::EmptySecret);
        }
        Ok(Self(SecretVec::new(bytes)))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }
}

impl fmt::Debug for ServerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServerSecret([REDACTED])")
    }
}

/// Authentication settings shared by the credential hasher and the token codec.
///
/// Built once at startup and handed to components by reference.
#[derive(Debug)]
pub struct AuthConfig {
    secret: ServerSecret,
    password_iterations: u32,
    token_ttl: Duration,
}

impl AuthConfig {
    /// Create a configuration with default iteration count and token lifetime.
    ///
    /// # Arguments
    /// * `secret` - Server secret used to sign session tokens
    pub fn new(secret: ServerSecret) -> Self {
        Self {
            secret,
            password_iterations: DEFAULT_ITERATIONS,
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECONDS),
        }
    }

    /// Build a configuration straight from secret bytes.
    pub fn from_secret(secret: impl Into<Vec<u8>>) -> Result<Self, AuthConfigError> {
        ServerSecret::new(secret).map(Self::new)
    }

    /// Override the PBKDF2 iteration count used for new credentials.
    pub fn with_password_iterations(mut self, iterations: u32) -> Result<Self, AuthConfigError> {
        if iterations == 0 {
            return Err(AuthConfigError::InvalidIterations);
        }
        self.password_iterations = iterations;
        Ok(self)
    }

    /// Override the default token lifetime.
    ///
    /// Token timestamps have one-second resolution, so the lifetime must be at
    /// least one whole second.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Result<Self, AuthConfigError> {
        if ttl.num_seconds() <= 0 {
            return Err(AuthConfigError::InvalidTokenTtl(ttl.num_seconds()));
        }
        self.token_ttl = ttl;
        Ok(self)
    }

    pub fn secret(&self) -> &ServerSecret {
        &self.secret
    }

    pub fn password_iterations(&self) -> u32 {
        self.password_iterations
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}
