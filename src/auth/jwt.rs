use std::time::Duration;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::AuthError;

/// Claims carried by access tokens. `sub` holds the user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    fn new(user_id: i64, ttl: Duration) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now.saturating_add(ttl.as_secs().try_into().unwrap_or(i64::MAX)),
        }
    }

    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, AuthError> {
        let claims = Claims::new(user_id, self.ttl);
        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Encode)
    }

    /// Decode `token`, rejecting bad signatures and expired tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_same_user() {
        let jwt = JwtService::new("secret", Duration::from_secs(60));
        let token = jwt.issue(42).unwrap();

        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new("secret", Duration::from_secs(60));
        let verifier = JwtService::new("other", Duration::from_secs(60));
        let token = issuer.issue(1).unwrap();

        assert!(matches!(verifier.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtService::new("secret", Duration::from_secs(60));
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: "1".into(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::default(), &claims, &jwt.encoding).unwrap();

        assert!(matches!(jwt.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_is_rejected() {
        let jwt = JwtService::new("secret", Duration::from_secs(60));
        assert!(jwt.verify("not-a-token").is_err());
    }
}
