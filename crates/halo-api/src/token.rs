use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use halo_types::api::Claims;

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("authorization header is missing")]
    Missing,

    #[error("authorization header must use the Bearer scheme")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token is invalid")]
    Invalid,

    #[error("token signing key is not configured")]
    MissingKey,

    #[error("failed to sign token")]
    Signing,
}

/// Issues and verifies HS256 bearer tokens. Tokens are never stored; expiry
/// is the only way one stops being valid.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingKey);
        }

        // Expiry is checked by hand against an explicit clock, without leeway.
        let mut validation = Validation::default();
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<String, TokenError> {
        let expires = now.checked_add_signed(self.ttl).ok_or(TokenError::Signing)?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Signing)
    }

    /// Verify signature and expiry, returning the subject user id. The caller
    /// still has to confirm the account exists.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<i64, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Invalid)?;

        if now.timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }

        data.claims.sub.parse().map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES)).unwrap()
    }

    #[test]
    fn accepted_before_expiry_and_rejected_after() {
        let tokens = service();
        let issued = Utc::now();
        let token = tokens.issue_at(7, issued).unwrap();

        assert_eq!(tokens.verify_at(&token, issued), Ok(7));
        assert_eq!(tokens.verify_at(&token, issued + Duration::minutes(59)), Ok(7));
        assert_eq!(
            tokens.verify_at(&token, issued + Duration::minutes(61)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = service().issue(1).unwrap();
        let other = TokenService::new("other-secret", Duration::minutes(60)).unwrap();
        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_is_invalid() {
        let tokens = service();
        assert_eq!(tokens.verify("not-a-jwt"), Err(TokenError::Invalid));
        assert_eq!(tokens.verify(""), Err(TokenError::Invalid));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let tokens = service();
        let mut token = tokens.issue(1).unwrap();
        token.push('x');
        assert_eq!(tokens.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn expiry_past_the_calendar_is_a_signing_error() {
        let tokens = TokenService::new("test-secret", Duration::days(365 * 300_000)).unwrap();
        assert_eq!(tokens.issue(1), Err(TokenError::Signing));
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            TokenService::new("", Duration::minutes(60)),
            Err(TokenError::MissingKey)
        ));
    }
}
