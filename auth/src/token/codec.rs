use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

use super::claims::SessionClaims;
use super::errors::AuthError;
use super::errors::IssueError;
use crate::config::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

/// Separator between the payload and signature segments.
///
/// Not part of the base64url alphabet, so splitting is unambiguous.
pub const SEPARATOR: char = '.';

/// Session token encoder and verifier.
///
/// Tokens have the form `base64url(payload).base64url(signature)` where the
/// payload is the compact JSON encoding of [`SessionClaims`] and the
/// signature is HMAC-SHA256 over the payload bytes, keyed with the server
/// secret. Tokens are stateless; nothing is persisted.
pub struct TokenCodec {
    mac: HmacSha256,
    default_ttl: Duration,
}

impl TokenCodec {
    /// Create a codec keyed with the configured server secret.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            mac: HmacSha256::new_from_slice(config.secret().expose())
                .expect("HMAC can take key of any size"),
            default_ttl: config.token_ttl(),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `subject` valid from `now` for `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Authenticated identity carried by the token
    /// * `now` - Current Unix time in seconds
    /// * `ttl` - Lifetime of the token
    ///
    /// # Errors
    /// * `EmptySubject` - Subject is empty
    /// * `InvalidTtl` - Lifetime is not positive
    /// * `EncodingFailed` - Payload serialization failed
    pub fn issue(&self, subject: &str, now: i64, ttl: Duration) -> Result<String, IssueError> {
        let claims = SessionClaims::new(subject, now, ttl)?;
        self.encode(&claims)
    }

    /// Issue a token using the configured default lifetime.
    pub fn issue_with_default_ttl(&self, subject: &str, now: i64) -> Result<String, IssueError> {
        self.issue(subject, now, self.default_ttl)
    }

    /// Verify a token and return its subject.
    ///
    /// The signature is checked before any payload field is interpreted.
    ///
    /// # Errors
    /// * `MalformedToken` - Not two base64url segments, or payload has the wrong shape
    /// * `BadSignature` - Signature does not match (tampered or signed with another secret)
    /// * `Expired` - `now` is past the expiration time
    /// * `NotYetValid` - `now` is before the issue time
    pub fn verify(&self, token: &str, now: i64) -> Result<String, AuthError> {
        let (payload, signature) = split(token)?;

        let mut mac = self.mac.clone();
        mac.update(&payload);
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::MalformedToken)?;
        if !claims.is_well_formed() {
            return Err(AuthError::MalformedToken);
        }

        if claims.is_expired(now) {
            return Err(AuthError::Expired);
        }
        if claims.is_not_yet_valid(now) {
            return Err(AuthError::NotYetValid);
        }

        Ok(claims.sub)
    }

    fn encode(&self, claims: &SessionClaims) -> Result<String, IssueError> {
        let payload =
            serde_json::to_vec(claims).map_err(|e| IssueError::EncodingFailed(e.to_string()))?;
        let signature = self.sign(&payload);

        Ok(format!(
            "{}{}{}",
            URL_SAFE_NO_PAD.encode(&payload),
            SEPARATOR,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Split a token into decoded payload and signature bytes.
///
/// Decoding is strict: padding and non-zero trailing bits are rejected as
/// malformed, so each token has exactly one accepted spelling.
fn split(token: &str) -> Result<(Vec<u8>, Vec<u8>), AuthError> {
    let (payload, signature) = token
        .split_once(SEPARATOR)
        .ok_or(AuthError::MalformedToken)?;

    if payload.is_empty() || signature.is_empty() || signature.contains(SEPARATOR) {
        return Err(AuthError::MalformedToken);
    }

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::MalformedToken)?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AuthError::MalformedToken)?;

    Ok((payload, signature))
}
