/*
 * Responsibility
 * - /api/users 系 handler
 * - Path/Query/Json を extractor で受け、DTO validation → repo 呼び出し
 * - 更新・削除は resource owner チェック + lookup cache の invalidate
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    api::dto::users::{UpdateUserRequest, UserResponse, UserSearchQuery},
    api::extractors::CurrentUser,
    error::AppError,
    repos::user_repo,
    state::AppState,
};

pub async fn me(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = principal.require_id()?;
    let row = user_repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(row.into()))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let rows = user_repo::search(&state.db, query.nickname.as_deref()).await?;
    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}

pub async fn by_nickname(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let row = user_repo::find_by_nickname(&state.db, &nickname)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(row.into()))
}

pub async fn by_id(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let row = user_repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(row.into()))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION", m))?;

    if principal.require_id()? != user_id {
        return Err(AppError::not_resource_owner());
    }

    let row = user_repo::update(
        &state.db,
        user_id,
        req.username.as_deref(),
        req.nickname.as_deref(),
    )
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict { .. } => AppError::conflict("DUPLICATE_NICKNAME", "nickname in use"),
        other => other,
    })?
    .ok_or_else(|| AppError::not_found("user"))?;

    state.user_lookup.invalidate(user_id).await;

    Ok(Json(row.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if principal.require_id()? != user_id {
        return Err(AppError::not_resource_owner());
    }

    let deleted = user_repo::delete(&state.db, user_id).await?;
    if !deleted {
        return Err(AppError::not_found("user"));
    }

    state.user_lookup.invalidate(user_id).await;

    Ok(StatusCode::NO_CONTENT)
}
