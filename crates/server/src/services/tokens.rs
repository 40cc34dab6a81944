//! JWT access tokens and opaque refresh tokens.
//!
//! Access tokens are short-lived HS256 JWTs carrying the user's identity and
//! role. Refresh tokens are 32 random bytes, base64url-encoded, stored
//! server-side next to the user row; they carry no claims.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tamarind_core::RefreshCredential;

use crate::config::JwtConfig;
use crate::models::AuthUser;

/// Key ID stamped into every token header, so a future key rotation can
/// route verification by `kid`.
const SIGNING_KEY_ID: &str = "main_signing_key";

const REFRESH_TOKEN_BYTES: usize = 32;

/// Errors from token issuance and verification.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token could not be signed.
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Token is malformed, has a bad signature, wrong issuer/audience, or
    /// (where expiry is checked) has expired.
    #[error("invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// Token is well-formed and correctly signed but past its expiry.
    #[error("token expired")]
    Expired,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID.
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl AccessClaims {
    /// Expiry as a UTC instant.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Issues and verifies the two token kinds.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    access_token_lifetime: TimeDelta,
    refresh_token_lifetime: TimeDelta,
}

impl TokenService {
    /// Build a token service from the JWT configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.signing_key.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_lifetime: TimeDelta::minutes(config.access_token_minutes),
            refresh_token_lifetime: TimeDelta::days(config.refresh_token_days),
        }
    }

    /// Sign a fresh access token for the user.
    ///
    /// Returns the encoded token and its expiry instant.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_access_token(
        &self,
        user: &AuthUser,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        let now = Utc::now();
        let expires_at = now + self.access_token_lifetime;

        let claims = AccessClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(SIGNING_KEY_ID.to_owned());

        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        Ok((token, expires_at))
    }

    /// Generate a fresh opaque refresh credential.
    #[must_use]
    pub fn issue_refresh_token(&self) -> RefreshCredential {
        let bytes: [u8; REFRESH_TOKEN_BYTES] = rand::random();
        let token = URL_SAFE_NO_PAD.encode(bytes);
        RefreshCredential::new(token, Utc::now() + self.refresh_token_lifetime)
    }

    /// Verify an access token's signature, issuer, audience, and expiry.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for a correctly signed but stale token
    /// and `TokenError::Invalid` for every other defect.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.decode(token, true)
    }

    /// Recover claims from a token whose expiry has lapsed.
    ///
    /// Signature, issuer, and audience are still enforced; only the expiry
    /// check is skipped. Silent refresh uses this to learn who the expired
    /// cookie belonged to.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if anything other than the expiry is
    /// wrong with the token.
    pub fn claims_from_expired(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.decode(token, false)
    }

    /// Read the expiry out of a token without verifying its signature.
    ///
    /// Only suitable for deciding whether to attempt a refresh; any decision
    /// with security weight must go through [`Self::verify_access_token`].
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if the token can't be parsed.
    pub fn decode_expiry_unverified(&self, token: &str) -> Result<DateTime<Utc>, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data =
            jsonwebtoken::decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
                .map_err(TokenError::Invalid)?;

        data.claims
            .expires_at()
            .ok_or_else(|| TokenError::Invalid(jsonwebtoken::errors::ErrorKind::ExpiredSignature.into()))
    }

    fn decode(&self, token: &str, validate_exp: bool) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = validate_exp;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use tamarind_core::UserId;

    use super::*;

    fn test_config(access_minutes: i64) -> JwtConfig {
        JwtConfig {
            signing_key: SecretString::from("kR9mP2xQ7wL4nT8vB3cF6hJ1dS5gA0eZ"),
            issuer: "tamarind".to_owned(),
            audience: "tamarind-clients".to_owned(),
            access_token_minutes: access_minutes,
            refresh_token_days: 7,
            cookie_domain: None,
            cookie_secure: true,
        }
    }

    fn test_user() -> AuthUser {
        AuthUser {
            id: UserId::new(),
            email: "alice@example.com".to_owned(),
            role: "Customer".to_owned(),
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let service = TokenService::new(&test_config(15));
        let user = test_user();

        let (token, expires_at) = service.issue_access_token(&user).unwrap();
        let claims = service.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, "Customer");
        assert_eq!(claims.iss, "tamarind");
        assert_eq!(claims.aud, "tamarind-clients");
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_expired_token_rejected_but_claims_recoverable() {
        let service = TokenService::new(&test_config(-5));
        let (token, _) = service.issue_access_token(&test_user()).unwrap();

        assert!(matches!(
            service.verify_access_token(&token),
            Err(TokenError::Expired)
        ));

        let claims = service.claims_from_expired(&token).unwrap();
        assert_eq!(claims.email, "alice@example.com");
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = TokenService::new(&test_config(15));
        let (token, _) = service.issue_access_token(&test_user()).unwrap();

        let mut tampered = token;
        tampered.pop();
        tampered.push('x');

        assert!(matches!(
            service.verify_access_token(&tampered),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_token_from_other_key_rejected() {
        let issuing = TokenService::new(&test_config(15));
        let (token, _) = issuing.issue_access_token(&test_user()).unwrap();

        let mut other_config = test_config(15);
        other_config.signing_key = SecretString::from("zY8wV5uT2sR9qP6oN3mL0kJ7iH4gF1eD");
        let verifying = TokenService::new(&other_config);

        assert!(matches!(
            verifying.verify_access_token(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_claims_still_require_valid_signature() {
        let service = TokenService::new(&test_config(-5));
        let (token, _) = service.issue_access_token(&test_user()).unwrap();

        let mut tampered = token;
        tampered.pop();
        tampered.push('x');

        assert!(service.claims_from_expired(&tampered).is_err());
    }

    #[test]
    fn test_unverified_expiry_matches_issued_expiry() {
        let service = TokenService::new(&test_config(15));
        let (token, expires_at) = service.issue_access_token(&test_user()).unwrap();

        let decoded = service.decode_expiry_unverified(&token).unwrap();
        assert_eq!(decoded.timestamp(), expires_at.timestamp());
    }

    #[test]
    fn test_refresh_tokens_are_unique_and_sized() {
        let service = TokenService::new(&test_config(15));

        let a = service.issue_refresh_token();
        let b = service.issue_refresh_token();

        assert_ne!(a.token(), b.token());
        let decoded = URL_SAFE_NO_PAD.decode(a.token()).unwrap();
        assert_eq!(decoded.len(), REFRESH_TOKEN_BYTES);
        assert!(a.expires_at() > Utc::now());
    }
}
