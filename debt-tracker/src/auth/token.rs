//! HS256 access tokens.
//!
//! Claims carry the user's email as `sub` plus `iat`/`exp` as unix seconds.
//! Validation runs with zero leeway, so a token is good strictly until `exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use super::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    /// Signs a token as if it had been issued at `issued_at`.
    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Sign(e.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(minutes: i64) -> TokenService {
        TokenService::new("test-secret", Duration::minutes(minutes))
    }

    #[test]
    fn issued_token_decodes_to_subject() {
        let svc = service(60);
        let token = svc.issue("alice@example.com").unwrap();
        let claims = svc.decode(&token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn accepted_just_before_expiry() {
        let svc = service(30);
        let issued = Utc::now() - Duration::minutes(30) + Duration::seconds(10);
        let token = svc.issue_at("bob@example.com", issued).unwrap();
        assert!(svc.decode(&token).is_ok());
    }

    #[test]
    fn rejected_just_after_expiry() {
        let svc = service(30);
        let issued = Utc::now() - Duration::minutes(30) - Duration::seconds(10);
        let token = svc.issue_at("bob@example.com", issued).unwrap();
        assert!(matches!(svc.decode(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn wrong_secret_fails_closed() {
        let token = service(60).issue("carol@example.com").unwrap();
        let other = TokenService::new("another-secret", Duration::minutes(60));
        assert!(matches!(other.decode(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_fails_closed() {
        assert!(matches!(service(5).decode("not.a.jwt"), Err(AuthError::InvalidToken)));
        assert!(matches!(service(5).decode(""), Err(AuthError::InvalidToken)));
    }
}
