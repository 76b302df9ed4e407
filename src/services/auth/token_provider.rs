//! HS256 access/refresh token issuance and validation.
//!
//! The signing secret is base64-encoded exactly once at construction and the
//! derived keys are immutable afterwards; nothing in this module mutates state.

use axum::http::{HeaderMap, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and validates the platform's signed tokens.
///
/// NOTE:
/// - `sub` is the numeric user id, carried as a string.
/// - Issued strings include the `"Bearer "` type prefix, mirroring what clients
///   send back in the Authorization header.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    // Signature still checked; only `exp` is ignored. Used where an expired
    // token must still disclose its subject.
    validation_ignore_exp: Validation,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenProvider")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenProvider {
    pub const TOKEN_TYPE: &'static str = "Bearer ";

    const ACCESS_TOKEN_VALID_SECONDS: i64 = 60 * 30; // 30 minutes
    const REFRESH_TOKEN_VALID_SECONDS: i64 = 60 * 60 * 24 * 7; // 7 days

    pub fn new(secret: &str) -> Self {
        // The configured secret is used in its base64 form, encoded here once.
        let encoded = BASE64.encode(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        // "not strictly after now" must fail, so no leeway.
        validation.leeway = 0;

        let mut validation_ignore_exp = validation.clone();
        validation_ignore_exp.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(encoded.as_bytes()),
            decoding_key: DecodingKey::from_secret(encoded.as_bytes()),
            validation,
            validation_ignore_exp,
        }
    }

    pub fn access_token_valid_seconds(&self) -> i64 {
        Self::ACCESS_TOKEN_VALID_SECONDS
    }

    pub fn refresh_token_valid_seconds(&self) -> i64 {
        Self::REFRESH_TOKEN_VALID_SECONDS
    }

    /// Issue an access token for `user_id`: `"Bearer " + <compact jwt>`.
    pub fn create_token(&self, user_id: &str) -> Result<String, TokenError> {
        self.create(user_id, Duration::seconds(Self::ACCESS_TOKEN_VALID_SECONDS))
    }

    /// Issue a refresh token. Same construction, longer window.
    pub fn create_refresh_token(&self, user_id: &str) -> Result<String, TokenError> {
        self.create(user_id, Duration::seconds(Self::REFRESH_TOKEN_VALID_SECONDS))
    }

    fn create(&self, user_id: &str, validity: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
        };

        let jwt = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(format!("{}{}", Self::TOKEN_TYPE, jwt))
    }

    /// Signature + expiry check. Every parse failure is a plain `false`; this
    /// never surfaces an error to the caller.
    pub fn validate_token(&self, token: &str) -> bool {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation).is_ok()
    }

    /// Extract the subject.
    ///
    /// An expired token still yields its subject (the signature must still
    /// verify); only malformed/forged tokens fail.
    pub fn user_id(&self, token: &str) -> Result<String, TokenError> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                let data = jsonwebtoken::decode::<Claims>(
                    token,
                    &self.decoding_key,
                    &self.validation_ignore_exp,
                )?;
                Ok(data.claims.sub)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Seconds of the token's validity window: `exp - iat`, clamped at zero.
    /// This is the total window, not the time left until expiry.
    pub fn remaining_validity(&self, token: &str) -> Result<std::time::Duration, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let seconds = (data.claims.exp - data.claims.iat).max(0);
        Ok(std::time::Duration::from_secs(seconds as u64))
    }

    /// Pull the credential out of the Authorization header, without the type
    /// prefix. Absent header, or one not strictly longer than the prefix,
    /// resolves to `None`.
    pub fn resolve_token(&self, headers: &HeaderMap) -> Option<String> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        Self::strip_token_type(value).map(str::to_string)
    }

    /// Length check only; the original scheme never compares the prefix bytes.
    pub fn strip_token_type(value: &str) -> Option<&str> {
        if value.len() <= Self::TOKEN_TYPE.len() {
            return None;
        }
        value.get(Self::TOKEN_TYPE.len()..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-signing-secret";

    fn provider() -> TokenProvider {
        TokenProvider::new(SECRET)
    }

    fn compact(token_with_type: &str) -> &str {
        TokenProvider::strip_token_type(token_with_type).expect("token has type prefix")
    }

    // Signs claims the same way the provider does: with the base64-encoded
    // secret. Lets tests forge expired tokens.
    fn sign_raw(secret: &str, claims: &Claims) -> String {
        let encoded = BASE64.encode(secret.as_bytes());
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(encoded.as_bytes()),
        )
        .expect("sign")
    }

    #[test]
    fn round_trips_subject_and_validates_fresh_token() {
        let p = provider();
        let token = p.create_token("42").expect("create");

        assert!(token.starts_with("Bearer "));
        let jwt = compact(&token);
        assert!(p.validate_token(jwt));
        assert_eq!(p.user_id(jwt).expect("subject"), "42");
    }

    #[test]
    fn validity_windows_match_the_configured_constants() {
        let p = provider();

        let access = p.create_token("7").expect("create");
        let refresh = p.create_refresh_token("7").expect("create");

        assert_eq!(
            p.remaining_validity(compact(&access)).expect("window"),
            std::time::Duration::from_secs(1800)
        );
        assert_eq!(
            p.remaining_validity(compact(&refresh)).expect("window"),
            std::time::Duration::from_secs(604800)
        );
    }

    #[test]
    fn expired_token_fails_validation_but_still_discloses_subject() {
        let p = provider();
        let now = Utc::now().timestamp();
        let jwt = sign_raw(
            SECRET,
            &Claims {
                sub: "42".into(),
                iat: now - 3600,
                exp: now - 60,
            },
        );

        assert!(!p.validate_token(&jwt));
        assert_eq!(p.user_id(&jwt).expect("subject"), "42");
    }

    #[test]
    fn negative_window_clamps_to_zero() {
        let p = provider();
        let now = Utc::now().timestamp();
        // iat after exp; still unexpired so the strict parse succeeds.
        let jwt = sign_raw(
            SECRET,
            &Claims {
                sub: "1".into(),
                iat: now + 7200,
                exp: now + 3600,
            },
        );

        assert_eq!(
            p.remaining_validity(&jwt).expect("window"),
            std::time::Duration::ZERO
        );
    }

    #[test]
    fn token_signed_with_a_different_secret_is_rejected() {
        let p = provider();
        let now = Utc::now().timestamp();
        let jwt = sign_raw(
            "another-secret",
            &Claims {
                sub: "42".into(),
                iat: now,
                exp: now + 600,
            },
        );

        assert!(!p.validate_token(&jwt));
        assert!(p.user_id(&jwt).is_err());
    }

    #[test]
    fn garbage_tokens_are_rejected_without_panicking() {
        let p = provider();
        assert!(!p.validate_token("not-a-jwt"));
        assert!(!p.validate_token(""));
        assert!(p.user_id("not-a-jwt").is_err());
    }

    #[test]
    fn resolve_token_header_edge_cases() {
        let p = provider();

        let mut headers = HeaderMap::new();
        assert_eq!(p.resolve_token(&headers), None);

        // Not strictly longer than the prefix.
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(p.resolve_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(p.resolve_token(&headers), None);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(p.resolve_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn same_secret_always_verifies_wherever_it_was_encoded() {
        // Two providers built from the same configured value must accept each
        // other's tokens (the base64 step happens once per construction).
        let a = TokenProvider::new(SECRET);
        let b = TokenProvider::new(SECRET);

        let token = a.create_token("9").expect("create");
        assert!(b.validate_token(compact(&token)));
    }
}
