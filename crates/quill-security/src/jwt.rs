//! JWT token handling
//!
//! Tokens are HS256-signed and carry a fixed claim set. The verifier accepts
//! HS256 only, so a token presenting any other `alg` (including `none`) is
//! rejected before its payload is trusted. Expiry is checked against the
//! injected [`Clock`] rather than the library's wall clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use quill_shared::{Clock, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Owning user id.
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    /// Unique per issuance, so two logins in the same second differ.
    pub jti: Uuid,
}

impl TokenClaims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: Uuid, username: &str, role: Role) -> Result<IssuedToken, JwtError> {
        let now = self.clock.now();
        let claims = TokenClaims {
            sub: user_id,
            username: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))?;
        Ok(IssuedToken { token, claims })
    }

    /// Checks signature, structure and expiry.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, JwtError> {
        let claims = self.inspect(token)?;
        if claims.exp <= self.clock.now().timestamp() {
            return Err(JwtError::TokenExpired);
        }
        Ok(claims)
    }

    /// Checks signature and structure but ignores expiry.
    pub fn inspect(&self, token: &str) -> Result<TokenClaims, JwtError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_shared::ManualClock;

    const SECRET: &str = "test-secret-test-secret-test-secret";

    fn codec(clock: Arc<ManualClock>) -> TokenCodec {
        TokenCodec::new(SECRET, Duration::minutes(15), clock)
    }

    #[test]
    fn test_issue_then_verify_returns_same_claims() {
        let clock = Arc::new(ManualClock::starting_now());
        let codec = codec(clock.clone());
        let user_id = Uuid::new_v4();

        let issued = codec.issue(user_id, "alice", Role::Admin).unwrap();
        let claims = codec.verify(&issued.token).unwrap();

        assert_eq!(claims, issued.claims);
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.expires_at() - claims.issued_at(), Duration::minutes(15));
        assert_eq!(claims.issued_at(), clock.now());
    }

    #[test]
    fn test_same_second_issues_are_distinct() {
        let codec = codec(Arc::new(ManualClock::starting_now()));
        let user_id = Uuid::new_v4();
        let a = codec.issue(user_id, "alice", Role::User).unwrap();
        let b = codec.issue(user_id, "alice", Role::User).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let clock = Arc::new(ManualClock::starting_now());
        let codec = codec(clock.clone());
        let issued = codec.issue(Uuid::new_v4(), "alice", Role::User).unwrap();

        clock.advance(Duration::minutes(15));
        assert!(matches!(codec.verify(&issued.token), Err(JwtError::TokenExpired)));
        // inspect still trusts the signature
        assert_eq!(codec.inspect(&issued.token).unwrap(), issued.claims);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let clock = Arc::new(ManualClock::starting_now());
        let issued = codec(clock.clone())
            .issue(Uuid::new_v4(), "alice", Role::User)
            .unwrap();
        let other = TokenCodec::new("another-secret-another-secret-xx", Duration::minutes(15), clock);
        assert!(matches!(other.verify(&issued.token), Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_other_algorithms_are_rejected() {
        let clock = Arc::new(ManualClock::starting_now());
        let codec = codec(clock.clone());
        let issued = codec.issue(Uuid::new_v4(), "alice", Role::User).unwrap();

        // Same secret, different HMAC variant.
        let hs512 = encode(
            &Header::new(Algorithm::HS512),
            &issued.claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(codec.verify(&hs512), Err(JwtError::ValidationError(_))));

        // {"alg":"none","typ":"JWT"} . {} . <empty>
        let unsigned = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.e30.";
        assert!(matches!(codec.verify(unsigned), Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_spliced_signature_is_rejected() {
        let codec = codec(Arc::new(ManualClock::starting_now()));
        let a = codec.issue(Uuid::new_v4(), "alice", Role::User).unwrap();
        let b = codec.issue(Uuid::new_v4(), "mallory", Role::Admin).unwrap();

        let a_parts: Vec<&str> = a.token.split('.').collect();
        let b_parts: Vec<&str> = b.token.split('.').collect();
        let spliced = format!("{}.{}.{}", a_parts[0], b_parts[1], a_parts[2]);
        assert!(matches!(codec.verify(&spliced), Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_malformed_and_untyped_payloads_are_rejected() {
        let codec = codec(Arc::new(ManualClock::starting_now()));
        assert!(codec.verify("").is_err());
        assert!(codec.verify("not-a-token").is_err());

        let bogus_role = serde_json::json!({
            "sub": Uuid::new_v4(),
            "username": "eve",
            "role": "superuser",
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + 600,
            "jti": Uuid::new_v4(),
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &bogus_role,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(codec.verify(&token), Err(JwtError::ValidationError(_))));

        let missing_iat = serde_json::json!({
            "sub": Uuid::new_v4(),
            "username": "eve",
            "role": "user",
            "exp": Utc::now().timestamp() + 600,
            "jti": Uuid::new_v4(),
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &missing_iat,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(codec.verify(&token), Err(JwtError::ValidationError(_))));
    }
}
