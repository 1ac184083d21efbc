//! Authentication utilities library
//!
//! Provides the authentication core of the gateway:
//! - Password credentials (PBKDF2-HMAC-SHA256 with per-credential salt and iteration count)
//! - Stateless signed session tokens (HMAC-SHA256, two base64url segments)
//! - Authentication coordination
//!
//! All operations are synchronous and pure. The current time is always passed
//! in by the caller, and the server secret lives in an explicit [`AuthConfig`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{AuthConfig, CredentialHasher};
//!
//! let config = AuthConfig::from_secret("server-secret").unwrap();
//! let hasher = CredentialHasher::new(&config);
//! let credential = hasher.derive("p@55word", None);
//! assert!(hasher.verify("p@55word", &credential));
//! assert!(!hasher.verify("wrong", &credential));
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{AuthConfig, AuthError, TokenCodec};
//! use chrono::Duration;
//!
//! let config = AuthConfig::from_secret("server-secret").unwrap();
//! let codec = TokenCodec::new(&config);
//! let token = codec.issue("user-42", 1000, Duration::seconds(3600)).unwrap();
//! assert_eq!(codec.verify(&token, 1000).unwrap(), "user-42");
//! assert_eq!(codec.verify(&token, 4601), Err(AuthError::Expired));
//! ```

pub mod authenticator;
pub mod config;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use config::AuthConfig;
pub use config::AuthConfigError;
pub use config::ServerSecret;
pub use password::Credential;
pub use password::CredentialHasher;
pub use password::PasswordError;
pub use password::Salt;
pub use token::AuthError;
pub use token::IssueError;
pub use token::SessionClaims;
pub use token::TokenCodec;
