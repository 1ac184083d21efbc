use std::fmt;
use std::str::FromStr;

use ::pbkdf2::password_hash::Output;
use ::pbkdf2::password_hash::PasswordHash;
use ::pbkdf2::password_hash::SaltString;
use ::pbkdf2::Algorithm;
use ::pbkdf2::Params;
use rand::rngs::OsRng;
use rand::RngCore;

use super::errors::PasswordError;

/// Salt length in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Derived digest length in bytes (SHA-256 output).
pub const DIGEST_LEN: usize = 32;

/// Per-credential random salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Generate a fresh salt from the operating system CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    /// Salt in the PHC B64 encoding.
    pub(crate) fn to_salt_string(self) -> Result<SaltString, PasswordError> {
        SaltString::encode_b64(&self.0).map_err(|e| malformed(format!("salt: {}", e)))
    }
}

/// Stored password credential.
///
/// Holds everything needed to re-derive and check a password: the salt, the
/// iteration count the digest was produced with, and the digest itself. The
/// plaintext is never kept.
///
/// The storage form is a PHC string,
/// `$pbkdf2-sha256$i=<iterations>,l=32$<salt>$<digest>`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub salt: Salt,
    pub iterations: u32,
    pub digest: [u8; DIGEST_LEN],
}

impl Credential {
    /// Build the PHC representation, borrowing the encoded salt.
    pub(crate) fn to_password_hash<'a>(
        &self,
        salt: &'a SaltString,
    ) -> Result<PasswordHash<'a>, PasswordError> {
        let params = Params {
            rounds: self.iterations,
            output_length: DIGEST_LEN,
        };

        Ok(PasswordHash {
            algorithm: Algorithm::Pbkdf2Sha256.ident(),
            version: None,
            params: params
                .try_into()
                .map_err(|e| malformed(format!("parameters: {}", e)))?,
            salt: Some(salt.as_salt()),
            hash: Some(
                Output::new(&self.digest).map_err(|e| malformed(format!("digest: {}", e)))?,
            ),
        })
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let salt = self.salt.to_salt_string().map_err(|_| fmt::Error)?;
        let hash = self.to_password_hash(&salt).map_err(|_| fmt::Error)?;
        write!(f, "{}", hash)
    }
}

impl FromStr for Credential {
    type Err = PasswordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hash = PasswordHash::new(s).map_err(|e| malformed(e.to_string()))?;

        if hash.algorithm != Algorithm::Pbkdf2Sha256.ident() {
            return Err(malformed(format!("unsupported algorithm '{}'", hash.algorithm)));
        }

        let params = Params::try_from(&hash).map_err(|e| malformed(e.to_string()))?;
        if params.rounds == 0 {
            return Err(malformed("iteration count must be at least 1"));
        }

        let salt = hash.salt.ok_or_else(|| malformed("missing salt"))?;
        let mut salt_buf = [0u8; SALT_LEN];
        let salt: [u8; SALT_LEN] = salt
            .decode_b64(&mut salt_buf)
            .map_err(|e| malformed(format!("salt: {}", e)))?
            .try_into()
            .map_err(|_| malformed(format!("salt must be {} bytes", SALT_LEN)))?;

        let digest: [u8; DIGEST_LEN] = hash
            .hash
            .ok_or_else(|| malformed("missing digest"))?
            .as_bytes()
            .try_into()
            .map_err(|_| malformed(format!("digest must be {} bytes", DIGEST_LEN)))?;

        Ok(Self {
            salt: Salt(salt),
            iterations: params.rounds,
            digest,
        })
    }
}

fn malformed(reason: impl Into<String>) -> PasswordError {
    PasswordError::MalformedCredential(reason.into())
}
