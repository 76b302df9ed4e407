//! Bearer トークン検証 → Principal を extensions に入れる → access matrix で判定
//!
//! Per-request flow:
//! - resolve the Authorization header; absent/invalid tokens pass through
//!   *unauthenticated* (no error surfaces from this layer)
//! - a valid token resolves to a Principal, inserted into request extensions
//! - the access matrix then decides: Public passes, a role requirement is
//!   checked against the Principal
//! - denials are browser redirects to the /exception endpoints, fully
//!   qualified unless the request host is localhost

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Method, Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};

use crate::middleware::auth::matrix::{Access, AccessMatrix};
use crate::services::auth::token_provider::TokenProvider;
use crate::services::auth::user_details::{AuthenticationResolver, Principal};
use crate::state::AppState;

pub const ACCESS_DENIED_PATH: &str = "/exception/accessdenied";
pub const ENTRY_POINT_PATH: &str = "/exception/entrypoint";

/// 全ルートに認証を掛けるための middleware を適用する。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

/// Outcome of the per-request check, before any response is built.
#[derive(Debug)]
enum Gate {
    Allow(Option<Principal>),
    Deny(&'static str),
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let gate = check_access(
        &state.tokens,
        &state.matrix,
        &state.auth,
        req.method(),
        req.uri().path(),
        req.headers(),
    )
    .await;

    match gate {
        Gate::Allow(Some(principal)) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Gate::Allow(None) => next.run(req).await,
        Gate::Deny(path) => deny(&req, &state, path),
    }
}

// {No-Token} → {Token-Present} → {Token-Valid, Principal-Set} | {Token-Invalid, No-Principal}
async fn check_access(
    tokens: &TokenProvider,
    matrix: &AccessMatrix,
    auth: &AuthenticationResolver,
    method: &Method,
    path: &str,
    headers: &HeaderMap,
) -> Gate {
    let principal = match tokens.resolve_token(headers) {
        Some(token) if tokens.validate_token(&token) => {
            match auth.get_authentication(&token).await {
                Ok(principal) => Some(principal),
                Err(err) => {
                    // Lookup failure is not the client's fault, but it still
                    // means "no identity" for this request.
                    tracing::warn!(error = ?err, "principal resolution failed");
                    None
                }
            }
        }
        _ => None,
    };

    match matrix.decide(method, path) {
        Access::Public => Gate::Allow(principal),
        Access::Role(role) => match principal {
            Some(principal) if principal.has_role(role) => Gate::Allow(Some(principal)),
            // Authenticated but missing the role.
            Some(_) => Gate::Deny(ACCESS_DENIED_PATH),
            // No usable credential at all.
            None => Gate::Deny(ENTRY_POINT_PATH),
        },
    }
}

fn deny(req: &Request<Body>, state: &AppState, path: &str) -> Response {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok());

    Redirect::to(&redirect_target(host, &state.public_base_url, path)).into_response()
}

/// Local path on localhost, fully-qualified URL everywhere else.
fn redirect_target(host: Option<&str>, public_base_url: &str, path: &str) -> String {
    let server_name = host.unwrap_or_default().split(':').next().unwrap_or_default();
    if server_name == "localhost" {
        path.to_string()
    } else {
        format!("{public_base_url}{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::HeaderValue;

    use crate::error::AppError;
    use crate::services::auth::user_details::{ROLE_NORMAL, UserLookup};

    const BASE: &str = "https://api.kukemeet.com";

    struct FixedLookup(Principal);

    #[async_trait]
    impl UserLookup for FixedLookup {
        async fn load_by_subject(&self, _subject: &str) -> Result<Principal, AppError> {
            Ok(self.0.clone())
        }
    }

    fn normal_principal(id: i64) -> Principal {
        Principal {
            id: Some(id),
            uid: Some(format!("user{id}")),
            roles: vec![ROLE_NORMAL.to_string()],
        }
    }

    fn setup(principal: Principal) -> (TokenProvider, AccessMatrix, AuthenticationResolver) {
        let tokens = TokenProvider::new("filter-secret");
        let auth = AuthenticationResolver::new(tokens.clone(), Arc::new(FixedLookup(principal)));
        (tokens, AccessMatrix::kuke_defaults(), auth)
    }

    fn authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn no_token_passes_public_routes_without_a_principal() {
        let (tokens, matrix, auth) = setup(normal_principal(1));

        let gate = check_access(
            &tokens,
            &matrix,
            &auth,
            &Method::GET,
            "/api/rooms",
            &HeaderMap::new(),
        )
        .await;

        assert!(matches!(gate, Gate::Allow(None)));
    }

    #[tokio::test]
    async fn no_token_on_a_protected_route_goes_to_the_entry_point() {
        let (tokens, matrix, auth) = setup(normal_principal(1));

        let gate = check_access(
            &tokens,
            &matrix,
            &auth,
            &Method::GET,
            "/api/users/me",
            &HeaderMap::new(),
        )
        .await;

        assert!(matches!(gate, Gate::Deny(ENTRY_POINT_PATH)));
    }

    #[tokio::test]
    async fn a_valid_token_resolves_a_principal_for_protected_routes() {
        let (tokens, matrix, auth) = setup(normal_principal(42));
        let issued = tokens.create_token("42").expect("create");
        let headers = authorization(&issued);

        let gate = check_access(
            &tokens,
            &matrix,
            &auth,
            &Method::GET,
            "/api/users/me",
            &headers,
        )
        .await;

        match gate {
            Gate::Allow(Some(principal)) => assert_eq!(principal.id, Some(42)),
            other => panic!("expected an authenticated pass, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn a_garbage_token_counts_as_unauthenticated() {
        let (tokens, matrix, auth) = setup(normal_principal(1));
        let headers = authorization("Bearer not-a-jwt");

        let public = check_access(
            &tokens,
            &matrix,
            &auth,
            &Method::GET,
            "/api/rooms",
            &headers,
        )
        .await;
        assert!(matches!(public, Gate::Allow(None)));

        let protected = check_access(
            &tokens,
            &matrix,
            &auth,
            &Method::GET,
            "/api/users/me",
            &headers,
        )
        .await;
        assert!(matches!(protected, Gate::Deny(ENTRY_POINT_PATH)));
    }

    #[tokio::test]
    async fn a_principal_without_the_role_is_access_denied() {
        let roleless = Principal {
            id: Some(7),
            uid: Some("user7".into()),
            roles: Vec::new(),
        };
        let (tokens, matrix, auth) = setup(roleless);
        let issued = tokens.create_token("7").expect("create");
        let headers = authorization(&issued);

        let gate = check_access(
            &tokens,
            &matrix,
            &auth,
            &Method::GET,
            "/api/users/me",
            &headers,
        )
        .await;

        assert!(matches!(gate, Gate::Deny(ACCESS_DENIED_PATH)));
    }

    #[test]
    fn localhost_gets_a_local_redirect_path() {
        assert_eq!(
            redirect_target(Some("localhost:3000"), BASE, ACCESS_DENIED_PATH),
            "/exception/accessdenied"
        );
        assert_eq!(
            redirect_target(Some("localhost"), BASE, ENTRY_POINT_PATH),
            "/exception/entrypoint"
        );
    }

    #[test]
    fn other_hosts_get_the_fully_qualified_url() {
        assert_eq!(
            redirect_target(Some("api.kukemeet.com"), BASE, ACCESS_DENIED_PATH),
            "https://api.kukemeet.com/exception/accessdenied"
        );
        assert_eq!(
            redirect_target(None, BASE, ENTRY_POINT_PATH),
            "https://api.kukemeet.com/exception/entrypoint"
        );
    }
}
