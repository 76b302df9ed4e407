/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use sqlx::PgPool;

use crate::api::cookies::CookieConfig;
use crate::middleware::auth::AccessMatrix;
use crate::services::auth::sign::SignService;
use crate::services::auth::user_details::{AuthenticationResolver, CachingUserLookup};
use crate::services::auth::TokenProvider;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: TokenProvider,
    pub auth: AuthenticationResolver,
    pub user_lookup: Arc<CachingUserLookup>,
    pub sign: SignService,
    pub matrix: Arc<AccessMatrix>,
    pub cookies: CookieConfig,
    pub public_base_url: Arc<str>,
}
