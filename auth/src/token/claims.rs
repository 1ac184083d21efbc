use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;

use super::errors::IssueError;

/// Signed payload of a session token.
///
/// Field order is fixed, so serialization is deterministic. Timestamps are
/// Unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SessionClaims {
    /// Subject (authenticated user identifier)
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,
}

impl SessionClaims {
    /// Create claims valid from `issued_at` for `ttl`.
    ///
    /// # Errors
    /// * `EmptySubject` - Subject is empty
    /// * `InvalidTtl` - Lifetime is not positive or overflows the timestamp range
    pub fn new(subject: &str, issued_at: i64, ttl: Duration) -> Result<Self, IssueError> {
        if subject.is_empty() {
            return Err(IssueError::EmptySubject);
        }

        let ttl_seconds = ttl.num_seconds();
        if ttl_seconds <= 0 {
            return Err(IssueError::InvalidTtl(ttl_seconds));
        }

        let expires_at = issued_at
            .checked_add(ttl_seconds)
            .ok_or(IssueError::InvalidTtl(ttl_seconds))?;

        Ok(Self {
            sub: subject.to_string(),
            iat: issued_at,
            exp: expires_at,
        })
    }

    /// Claims are well formed when they name a subject and `exp > iat`.
    pub fn is_well_formed(&self) -> bool {
        !self.sub.is_empty() && self.exp > self.iat
    }

    /// Check if token is expired. A token is still valid at exactly `exp`.
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.exp
    }

    pub fn is_not_yet_valid(&self, now: i64) -> bool {
        now < self.iat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims() {
        let claims = SessionClaims::new("user-42", 1000, Duration::seconds(3600)).unwrap();
        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.iat, 1000);
        assert_eq!(claims.exp, 4600);
        assert!(claims.is_well_formed());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            SessionClaims::new("", 1000, Duration::hours(1)).unwrap_err(),
            IssueError::EmptySubject
        );
        assert_eq!(
            SessionClaims::new("user", 1000, Duration::zero()).unwrap_err(),
            IssueError::InvalidTtl(0)
        );
        assert_eq!(
            SessionClaims::new("user", 1000, Duration::seconds(-5)).unwrap_err(),
            IssueError::InvalidTtl(-5)
        );
        assert!(matches!(
            SessionClaims::new("user", i64::MAX - 10, Duration::hours(1)),
            Err(IssueError::InvalidTtl(_))
        ));
    }

    #[test]
    fn test_validity_window() {
        let claims = SessionClaims::new("user", 1000, Duration::seconds(10)).unwrap();

        assert!(claims.is_not_yet_valid(999));
        assert!(!claims.is_not_yet_valid(1000));
        assert!(!claims.is_expired(1010)); // Exactly at expiration
        assert!(claims.is_expired(1011));
    }

    #[test]
    fn test_serialization_is_compact_and_ordered() {
        let claims = SessionClaims::new("user-42", 1000, Duration::seconds(3600)).unwrap();
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"sub":"user-42","iat":1000,"exp":4600}"#);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_json::from_str::<SessionClaims>(
            r#"{"sub":"user","iat":1,"exp":2,"role":"admin"}"#,
        );
        assert!(result.is_err());
    }
}
