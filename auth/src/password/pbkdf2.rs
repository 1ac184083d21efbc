use ::pbkdf2::password_hash::PasswordVerifier;
use ::pbkdf2::Pbkdf2;
use sha2::Sha256;

use super::credential::Credential;
use super::credential::Salt;
use super::credential::DIGEST_LEN;
use crate::config::AuthConfig;

/// Default PBKDF2 iteration count for new credentials.
pub const DEFAULT_ITERATIONS: u32 = 120_000;

/// Password hashing implementation.
///
/// Derives credentials with PBKDF2-HMAC-SHA256. The iteration count only
/// applies to newly derived credentials; verification always uses the count
/// stored in the credential, so raising it does not invalidate old ones.
///
/// Derivation is deliberately slow. Async callers should run it on a
/// blocking worker rather than on the executor threads.
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    iterations: u32,
}

impl CredentialHasher {
    /// Create a hasher from the shared authentication configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            iterations: config.password_iterations(),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Derive a credential from a plaintext password.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    /// * `salt` - Salt to use; a fresh random one is generated when `None`
    ///
    /// # Returns
    /// Credential holding salt, iteration count, and digest
    pub fn derive(&self, password: &str, salt: Option<Salt>) -> Credential {
        let salt = salt.unwrap_or_else(Salt::generate);
        let digest = derive_digest(password, &salt, self.iterations);

        Credential {
            salt,
            iterations: self.iterations,
            digest,
        }
    }

    /// Verify a password against a stored credential.
    ///
    /// The digest comparison is constant time.
    ///
    /// # Returns
    /// True only when the re-derived digest matches exactly
    pub fn verify(&self, password: &str, credential: &Credential) -> bool {
        let Ok(salt) = credential.salt.to_salt_string() else {
            return false;
        };
        let Ok(hash) = credential.to_password_hash(&salt) else {
            return false;
        };

        Pbkdf2.verify_password(password.as_bytes(), &hash).is_ok()
    }
}

fn derive_digest(password: &str, salt: &Salt, iterations: u32) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    ::pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut digest);
    digest
}
