//! Route access matrix: an explicit ordered list of (method, path pattern) →
//! required access, evaluated top to bottom, first match wins. Unmatched
//! routes fall back to requiring the NORMAL role, so new endpoints are
//! protected until someone deliberately opens them.

use axum::http::Method;

use crate::services::auth::user_details::ROLE_NORMAL;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    Role(&'static str),
}

#[derive(Debug)]
struct Rule {
    // None matches every method.
    method: Option<Method>,
    pattern: &'static str,
    access: Access,
}

/// Matches a single pattern against a path.
///
/// Supported forms, same as what the route table needs:
/// - exact: `/api/rooms`
/// - subtree: `/api/rooms/**` (matches the base path and everything below it)
fn pattern_matches(pattern: &str, path: &str) -> bool {
    if let Some(base) = pattern.strip_suffix("/**") {
        return path == base || (path.starts_with(base) && path.as_bytes().get(base.len()) == Some(&b'/'));
    }
    pattern == path
}

#[derive(Debug)]
pub struct AccessMatrix {
    rules: Vec<Rule>,
    fallback: Access,
}

impl AccessMatrix {
    /// The platform's route table. Order matters: `/api/users/me` is listed
    /// before the public user wildcard that would otherwise swallow it.
    pub fn kuke_defaults() -> Self {
        use Access::{Public, Role};

        let post = |pattern, access| Rule {
            method: Some(Method::POST),
            pattern,
            access,
        };
        let get = |pattern, access| Rule {
            method: Some(Method::GET),
            pattern,
            access,
        };

        Self {
            rules: vec![
                post("/api/sign/login", Public),
                post("/api/sign/register", Public),
                post("/api/sign/refresh-token", Public),
                post("/api/sign/login-by-provider", Public),
                post("/api/sign/register-by-provider", Public),
                get("/exception/**", Public),
                get("/api/users/me", Role(ROLE_NORMAL)),
                get("/api/friends/me", Role(ROLE_NORMAL)),
                get("/api/users/**", Public),
                get("/api/rooms/**", Public),
                get("/kuke-health/health", Public),
            ],
            fallback: Access::Role(ROLE_NORMAL),
        }
    }

    pub fn decide(&self, method: &Method, path: &str) -> &Access {
        self.rules
            .iter()
            .find(|rule| {
                rule.method.as_ref().is_none_or(|m| m == method)
                    && pattern_matches(rule.pattern, path)
            })
            .map(|rule| &rule.access)
            .unwrap_or(&self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> AccessMatrix {
        AccessMatrix::kuke_defaults()
    }

    #[test]
    fn sign_endpoints_are_public() {
        let m = matrix();
        assert_eq!(m.decide(&Method::POST, "/api/sign/login"), &Access::Public);
        assert_eq!(
            m.decide(&Method::POST, "/api/sign/register"),
            &Access::Public
        );
        assert_eq!(
            m.decide(&Method::POST, "/api/sign/refresh-token"),
            &Access::Public
        );
    }

    #[test]
    fn me_routes_require_the_role_despite_the_public_subtree() {
        let m = matrix();
        // First match wins: the /me rules sit above the public wildcard.
        assert_eq!(
            m.decide(&Method::GET, "/api/users/me"),
            &Access::Role(ROLE_NORMAL)
        );
        assert_eq!(
            m.decide(&Method::GET, "/api/friends/me"),
            &Access::Role(ROLE_NORMAL)
        );
        assert_eq!(m.decide(&Method::GET, "/api/users/42"), &Access::Public);
        assert_eq!(m.decide(&Method::GET, "/api/users"), &Access::Public);
    }

    #[test]
    fn room_listing_is_public_but_creation_is_not() {
        let m = matrix();
        assert_eq!(m.decide(&Method::GET, "/api/rooms"), &Access::Public);
        assert_eq!(m.decide(&Method::GET, "/api/rooms/3"), &Access::Public);
        assert_eq!(
            m.decide(&Method::POST, "/api/rooms"),
            &Access::Role(ROLE_NORMAL)
        );
    }

    #[test]
    fn unmatched_routes_fall_back_to_the_role_requirement() {
        let m = matrix();
        assert_eq!(
            m.decide(&Method::POST, "/api/messages"),
            &Access::Role(ROLE_NORMAL)
        );
        assert_eq!(
            m.decide(&Method::DELETE, "/api/users/42"),
            &Access::Role(ROLE_NORMAL)
        );
        assert_eq!(
            m.decide(&Method::GET, "/made/up/route"),
            &Access::Role(ROLE_NORMAL)
        );
        // Friend listing only exists as /api/friends/me; the bare collection
        // path has no route and no rule, so it stays behind the fallback.
        assert_eq!(
            m.decide(&Method::GET, "/api/friends"),
            &Access::Role(ROLE_NORMAL)
        );
    }

    #[test]
    fn subtree_patterns_do_not_match_sibling_prefixes() {
        assert!(pattern_matches("/api/rooms/**", "/api/rooms"));
        assert!(pattern_matches("/api/rooms/**", "/api/rooms/1/deep"));
        assert!(!pattern_matches("/api/rooms/**", "/api/roomsx"));
        assert!(!pattern_matches("/api/rooms", "/api/rooms/1"));
    }
}
