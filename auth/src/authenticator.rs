use chrono::Duration;

use crate::config::AuthConfig;
use crate::password::credential::DIGEST_LEN;
use crate::password::credential::SALT_LEN;
use crate::password::Credential;
use crate::password::CredentialHasher;
use crate::password::Salt;
use crate::token::AuthError;
use crate::token::IssueError;
use crate::token::TokenCodec;

/// Authentication coordinator combining password verification and token issuance.
///
/// Holds no mutable state; share it behind an `Arc` across request tasks.
pub struct Authenticator {
    password_hasher: CredentialHasher,
    token_codec: TokenCodec,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,

    /// Expiration time of the token (Unix timestamp)
    pub expires_at: i64,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    Token(#[from] IssueError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `config` - Shared authentication configuration (secret, iterations, token lifetime)
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            password_hasher: CredentialHasher::new(config),
            token_codec: TokenCodec::new(config),
        }
    }

    /// Derive a credential for storage from a plaintext password.
    pub fn hash_password(&self, password: &str) -> Credential {
        self.password_hasher.derive(password, None)
    }

    pub fn verify_password(&self, password: &str, credential: &Credential) -> bool {
        self.password_hasher.verify(password, credential)
    }

    /// Credential that no password matches, carrying the configured iteration count.
    ///
    /// Verify against it when no account exists, so an unknown login costs
    /// the same as a wrong password.
    pub fn decoy_credential(&self) -> Credential {
        Credential {
            salt: Salt::from_bytes([0u8; SALT_LEN]),
            iterations: self.password_hasher.iterations(),
            digest: [0u8; DIGEST_LEN],
        }
    }

    /// Verify credentials and issue a session token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `credential` - Stored credential
    /// * `subject` - Identity to carry in the token
    /// * `now` - Current Unix time in seconds
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `Token` - Token issuance failed
    pub fn authenticate(
        &self,
        password: &str,
        credential: &Credential,
        subject: &str,
        now: i64,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.verify_password(password, credential) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token(subject, now)?)
    }

    /// Issue a token with the configured lifetime without password verification.
    ///
    /// Used right after registration, when the password was just derived.
    pub fn issue_token(&self, subject: &str, now: i64) -> Result<AuthenticationResult, IssueError> {
        self.issue_token_with_ttl(subject, now, self.token_codec.default_ttl())
    }

    pub fn issue_token_with_ttl(
        &self,
        subject: &str,
        now: i64,
        ttl: Duration,
    ) -> Result<AuthenticationResult, IssueError> {
        let access_token = self.token_codec.issue(subject, now, ttl)?;

        Ok(AuthenticationResult {
            access_token,
            expires_at: now + ttl.num_seconds(),
        })
    }

    /// Validate a token and return the authenticated subject.
    pub fn validate_token(&self, token: &str, now: i64) -> Result<String, AuthError> {
        self.token_codec.verify(token, now)
    }
}
