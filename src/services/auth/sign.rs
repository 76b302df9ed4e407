//! Sign-in lifecycle: registration, login (local + provider), token refresh,
//! logout, password changes.
//!
//! Refresh tokens are JWTs like access tokens, but the compact form of the
//! latest one is persisted per user; refresh only succeeds when the presented
//! token both validates and matches the stored one, and every refresh rotates
//! the pair.

use std::sync::Arc;

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use sqlx::PgPool;
use tracing::info;

use crate::error::AppError;
use crate::repos::user_repo;
use crate::services::auth::token_provider::TokenProvider;
use crate::services::auth::user_details::{CachingUserLookup, parse_subject};

/// Social login providers this deployment knows about.
const REGISTERED_PROVIDERS: &[&str] = &["kakao"];

/// What a successful login/refresh hands back to the handler. Token strings
/// carry the `"Bearer "` type prefix, as issued.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct SignService {
    db: PgPool,
    tokens: TokenProvider,
    lookup: Arc<CachingUserLookup>,
}

impl SignService {
    pub fn new(db: PgPool, tokens: TokenProvider, lookup: Arc<CachingUserLookup>) -> Self {
        Self { db, tokens, lookup }
    }

    pub async fn register(
        &self,
        uid: &str,
        password: &str,
        username: &str,
        nickname: &str,
    ) -> Result<i64, AppError> {
        let hash = hash_password(password)?;

        // Duplicate uid/nickname surfaces as a unique violation → Conflict.
        let user = user_repo::create(&self.db, uid, Some(&hash), username, nickname, None)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict { .. } => {
                    AppError::conflict("DUPLICATE_USER", "uid or nickname already in use")
                }
                other => other,
            })?;

        info!(user_id = user.id, "registered user");
        Ok(user.id)
    }

    pub async fn login(&self, uid: &str, password: &str) -> Result<TokenPair, AppError> {
        let user = user_repo::find_by_uid(&self.db, uid)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // Social-only accounts have no password; they cannot log in locally.
        let stored = user.password.as_deref().ok_or(AppError::Unauthorized)?;
        if !verify_password(password, stored) {
            return Err(AppError::Unauthorized);
        }

        self.issue_pair(user.id).await
    }

    /// Provider-side identity is carried in `provider_uid`; only registered
    /// providers are dispatched, anything else is a typed client error.
    pub async fn login_by_provider(
        &self,
        provider: &str,
        provider_uid: &str,
    ) -> Result<TokenPair, AppError> {
        ensure_registered(provider)?;

        let user = user_repo::find_by_provider_uid(&self.db, provider, provider_uid)
            .await?
            .ok_or(AppError::not_found("user"))?;

        self.issue_pair(user.id).await
    }

    /// Registers and logs in, like the local flow but without a password.
    pub async fn register_by_provider(
        &self,
        provider: &str,
        provider_uid: &str,
        username: &str,
        nickname: &str,
    ) -> Result<TokenPair, AppError> {
        ensure_registered(provider)?;

        let user = user_repo::create(
            &self.db,
            provider_uid,
            None,
            username,
            nickname,
            Some(provider),
        )
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => {
                AppError::conflict("DUPLICATE_USER", "uid or nickname already in use")
            }
            other => other,
        })?;

        info!(user_id = user.id, provider, "registered user by provider");
        self.issue_pair(user.id).await
    }

    /// `authorization` is the raw Authorization header value carrying the
    /// refresh token.
    pub async fn refresh_token(&self, authorization: &str) -> Result<TokenPair, AppError> {
        let presented =
            TokenProvider::strip_token_type(authorization).ok_or(AppError::Unauthorized)?;

        if !self.tokens.validate_token(presented) {
            return Err(AppError::Unauthorized);
        }

        let subject = self.tokens.user_id(presented)?;
        let user_id = parse_subject(&subject).ok_or(AppError::Unauthorized)?;

        let user = user_repo::find_by_id(&self.db, user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // Must be the refresh token we issued last; a logout or an earlier
        // rotation makes older ones unusable even before they expire.
        if user.refresh_token.as_deref() != Some(presented) {
            return Err(AppError::Unauthorized);
        }

        self.issue_pair(user_id).await
    }

    pub async fn logout(&self, user_id: i64) -> Result<(), AppError> {
        user_repo::set_refresh_token(&self.db, user_id, None).await?;
        self.lookup.invalidate(user_id).await;
        Ok(())
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = user_repo::find_by_id(&self.db, user_id)
            .await?
            .ok_or(AppError::not_found("user"))?;

        let stored = user.password.as_deref().ok_or_else(|| {
            AppError::bad_request("NO_LOCAL_PASSWORD", "social accounts have no password")
        })?;
        if !verify_password(old_password, stored) {
            return Err(AppError::Unauthorized);
        }

        let hash = hash_password(new_password)?;
        user_repo::set_password(&self.db, user_id, &hash).await?;
        Ok(())
    }

    async fn issue_pair(&self, user_id: i64) -> Result<TokenPair, AppError> {
        let subject = user_id.to_string();
        let access_token = self.tokens.create_token(&subject)?;
        let refresh_token = self.tokens.create_refresh_token(&subject)?;

        // Stored compact, compared compact.
        let compact = TokenProvider::strip_token_type(&refresh_token).ok_or(AppError::Internal)?;
        user_repo::set_refresh_token(&self.db, user_id, Some(compact)).await?;

        Ok(TokenPair {
            user_id,
            access_token,
            refresh_token,
        })
    }
}

fn ensure_registered(provider: &str) -> Result<(), AppError> {
    if REGISTERED_PROVIDERS.contains(&provider) {
        Ok(())
    } else {
        Err(AppError::not_registered_provider(provider))
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AppError::Internal)
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hashing_round_trip() {
        let hash = hash_password("s3cret").expect("hash");
        assert_ne!(hash, "s3cret");
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn two_hashes_of_the_same_password_differ() {
        // Salted: equal inputs must not produce equal hashes.
        let a = hash_password("same").expect("hash");
        let b = hash_password("same").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn only_known_providers_are_dispatched() {
        assert!(ensure_registered("kakao").is_ok());

        let err = ensure_registered("naver").expect_err("unknown provider");
        assert!(matches!(
            err,
            AppError::BadRequest {
                code: "NOT_REGISTERED_PROVIDER",
                ..
            }
        ));
    }
}
