/*
 * Responsibility
 * - Handler で認証済み Principal を受け取るための extractor
 * - middleware が request.extensions() に insert 済みである前提
 * - 見つからない場合は 401（認証がかかってない・ミドルウェア未設定）
 */
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Principal;
use crate::state::AppState;

pub struct CurrentUser(pub Principal);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}
