//! Token → Principal resolution.
//!
//! The resolver extracts the subject from a (valid) token and asks a
//! `UserLookup` collaborator for the full identity. Lookups are memoized in an
//! explicit cache keyed by subject, invalidated whenever the user record
//! changes (update/delete/logout).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::warn;

use crate::error::AppError;
use crate::repos::user_repo;
use crate::services::auth::token_provider::TokenProvider;
use crate::services::cache::CacheClient;

pub const ROLE_NORMAL: &str = "NORMAL";

/// Resolved per-request identity. Never persisted; serialization exists only
/// for the lookup cache.
///
/// A subject that does not resolve to a real user becomes the *empty*
/// principal (no id, no roles). Access decisions then fail on the missing role
/// rather than on a lookup error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Option<i64>,
    pub uid: Option<String>,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn empty() -> Self {
        Self {
            id: None,
            uid: None,
            roles: Vec::new(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// The concrete user id, or Forbidden for the empty principal.
    pub fn require_id(&self) -> Result<i64, AppError> {
        self.id.ok_or(AppError::Forbidden)
    }
}

/// Identity lookup keyed by token subject.
#[async_trait]
pub trait UserLookup: Send + Sync + 'static {
    async fn load_by_subject(&self, subject: &str) -> Result<Principal, AppError>;
}

/// Subjects are numeric user ids carried as strings; anything else maps to the
/// empty principal, same as an unknown id.
pub fn parse_subject(subject: &str) -> Option<i64> {
    subject.parse::<i64>().ok()
}

pub struct DbUserLookup {
    db: PgPool,
}

impl DbUserLookup {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserLookup for DbUserLookup {
    async fn load_by_subject(&self, subject: &str) -> Result<Principal, AppError> {
        let Some(user_id) = parse_subject(subject) else {
            return Ok(Principal::empty());
        };

        let Some(user) = user_repo::find_by_id(&self.db, user_id).await? else {
            return Ok(Principal::empty());
        };

        let roles = user_repo::roles(&self.db, user.id).await?;

        Ok(Principal {
            id: Some(user.id),
            uid: Some(user.uid),
            roles,
        })
    }
}

/// Get-or-populate wrapper around a `UserLookup`.
///
/// Cache policy:
/// - Only resolved (non-empty) principals are cached.
/// - A dead cache degrades to plain DB reads (fail-open), logged at warn.
pub struct CachingUserLookup {
    inner: Arc<dyn UserLookup>,
    cache: Arc<dyn CacheClient>,
    ttl: Duration,
}

impl CachingUserLookup {
    pub fn new(inner: Arc<dyn UserLookup>, cache: Arc<dyn CacheClient>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn key(subject: &str) -> String {
        format!("user-details:{subject}")
    }

    /// Drop the cached identity for `user_id`. Must be called on any change to
    /// the user row (profile update, delete, logout).
    pub async fn invalidate(&self, user_id: i64) {
        let key = Self::key(&user_id.to_string());
        if let Err(e) = self.cache.del(&key).await {
            warn!(backend = self.cache.backend_name(), error = %e, key = %key,
                "user-details cache invalidation failed");
        }
    }
}

#[async_trait]
impl UserLookup for CachingUserLookup {
    async fn load_by_subject(&self, subject: &str) -> Result<Principal, AppError> {
        let key = Self::key(subject);

        match self.cache.get_string(&key).await {
            Ok(Some(json)) => match serde_json::from_str::<Principal>(&json) {
                Ok(principal) => return Ok(principal),
                Err(e) => {
                    // Stale/corrupt entry; fall through to the real lookup.
                    warn!(error = %e, key = %key, "discarding undecodable cache entry");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(backend = self.cache.backend_name(), error = %e,
                    "user-details cache read failed");
            }
        }

        let principal = self.inner.load_by_subject(subject).await?;

        if principal.id.is_some()
            && let Ok(json) = serde_json::to_string(&principal)
            && let Err(e) = self.cache.set_string_with_ttl(&key, &json, self.ttl).await
        {
            warn!(backend = self.cache.backend_name(), error = %e,
                "user-details cache write failed");
        }

        Ok(principal)
    }
}

/// Maps a token to a Principal.
#[derive(Clone)]
pub struct AuthenticationResolver {
    tokens: TokenProvider,
    lookup: Arc<dyn UserLookup>,
}

impl AuthenticationResolver {
    pub fn new(tokens: TokenProvider, lookup: Arc<dyn UserLookup>) -> Self {
        Self { tokens, lookup }
    }

    /// Subject out of the token, identity out of the lookup. Callers validate
    /// the token first; an expired-but-signed token still resolves here.
    pub async fn get_authentication(&self, token: &str) -> Result<Principal, AppError> {
        let subject = self.tokens.user_id(token)?;
        self.lookup.load_by_subject(&subject).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::client::{CacheError, CacheResult};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubLookup {
        calls: AtomicUsize,
        principal: Principal,
    }

    #[async_trait]
    impl UserLookup for StubLookup {
        async fn load_by_subject(&self, _subject: &str) -> Result<Principal, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.principal.clone())
        }
    }

    #[derive(Default)]
    struct MemoryCache {
        map: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl CacheClient for MemoryCache {
        fn backend_name(&self) -> &'static str {
            "memory"
        }

        async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
            Ok(self.map.lock().unwrap().get(key).cloned())
        }

        async fn set_string_with_ttl(
            &self,
            key: &str,
            value: &str,
            _ttl: Duration,
        ) -> CacheResult<()> {
            self.map
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn del(&self, key: &str) -> CacheResult<u64> {
            Ok(self.map.lock().unwrap().remove(key).is_some() as u64)
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl CacheClient for BrokenCache {
        fn backend_name(&self) -> &'static str {
            "broken"
        }

        async fn get_string(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::BackendConnection("down".into()))
        }

        async fn set_string_with_ttl(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Duration,
        ) -> CacheResult<()> {
            Err(CacheError::BackendConnection("down".into()))
        }

        async fn del(&self, _key: &str) -> CacheResult<u64> {
            Err(CacheError::BackendConnection("down".into()))
        }
    }

    fn normal_principal(id: i64) -> Principal {
        Principal {
            id: Some(id),
            uid: Some(format!("user{id}")),
            roles: vec![ROLE_NORMAL.to_string()],
        }
    }

    fn caching(
        principal: Principal,
        cache: Arc<dyn CacheClient>,
    ) -> (CachingUserLookup, Arc<StubLookup>) {
        let stub = Arc::new(StubLookup {
            calls: AtomicUsize::new(0),
            principal,
        });
        let lookup = CachingUserLookup::new(stub.clone(), cache, Duration::from_secs(60));
        (lookup, stub)
    }

    #[tokio::test]
    async fn second_load_is_served_from_the_cache() {
        let (lookup, stub) = caching(normal_principal(42), Arc::new(MemoryCache::default()));

        let first = lookup.load_by_subject("42").await.expect("load");
        let second = lookup.load_by_subject("42").await.expect("load");

        assert_eq!(first.id, Some(42));
        assert_eq!(second.id, Some(42));
        assert!(second.has_role(ROLE_NORMAL));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_principals_are_not_cached() {
        let (lookup, stub) = caching(Principal::empty(), Arc::new(MemoryCache::default()));

        lookup.load_by_subject("999").await.expect("load");
        lookup.load_by_subject("999").await.expect("load");

        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_a_fresh_lookup() {
        let (lookup, stub) = caching(normal_principal(7), Arc::new(MemoryCache::default()));

        lookup.load_by_subject("7").await.expect("load");
        lookup.invalidate(7).await;
        lookup.load_by_subject("7").await.expect("load");

        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn a_dead_cache_degrades_to_direct_lookups() {
        let (lookup, stub) = caching(normal_principal(1), Arc::new(BrokenCache));

        let principal = lookup.load_by_subject("1").await.expect("load");

        assert_eq!(principal.id, Some(1));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolver_maps_token_subject_through_the_lookup() {
        let tokens = TokenProvider::new("resolver-secret");
        let stub = Arc::new(StubLookup {
            calls: AtomicUsize::new(0),
            principal: normal_principal(42),
        });
        let resolver = AuthenticationResolver::new(tokens.clone(), stub);

        let token = tokens.create_token("42").expect("create");
        let jwt = TokenProvider::strip_token_type(&token).expect("prefix");

        let principal = resolver.get_authentication(jwt).await.expect("resolve");
        assert_eq!(principal.id, Some(42));
        assert_eq!(principal.roles, vec![ROLE_NORMAL.to_string()]);
    }

    #[test]
    fn non_numeric_subjects_parse_to_none() {
        assert_eq!(parse_subject("42"), Some(42));
        assert_eq!(parse_subject("forty-two"), None);
        assert_eq!(parse_subject(""), None);
    }
}
