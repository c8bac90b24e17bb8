//! services/api/src/web/token.rs
//!
//! Signed session tokens (HS256 JWT). There is no revocation list: a token
//! stays valid until `exp`, even after the cookie carrying it is cleared.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use portal_core::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of a session in seconds, shared by the token `exp` and the cookie `Max-Age`.
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal id)
    pub sub: Uuid,
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn new(principal_id: Uuid, role: Role, issued_at: DateTime<Utc>) -> Self {
        Self {
            sub: principal_id,
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(SESSION_TTL_SECS)).timestamp(),
        }
    }
}

/// Signs and verifies session tokens with the server secret.
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionTokens {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_keeps_claims() {
        let tokens = SessionTokens::new(b"test-secret");
        let claims = Claims::new(Uuid::new_v4(), Role::Admin, Utc::now());
        let token = tokens.sign(&claims).unwrap();

        assert_eq!(tokens.verify(&token).unwrap(), claims);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn rejects_expired_tokens() {
        let tokens = SessionTokens::new(b"test-secret");
        let issued = Utc::now() - Duration::hours(25);
        let token = tokens
            .sign(&Claims::new(Uuid::new_v4(), Role::Student, issued))
            .unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn rejects_foreign_signatures() {
        let ours = SessionTokens::new(b"test-secret");
        let theirs = SessionTokens::new(b"other-secret");
        let token = theirs
            .sign(&Claims::new(Uuid::new_v4(), Role::Admin, Utc::now()))
            .unwrap();

        assert!(ours.verify(&token).is_err());
    }
}
