/*
 * Responsibility
 * - /api/friends 系 handler
 * - 片方向の friend 関係の一覧/追加/削除
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::dto::friends::FriendResponse,
    api::extractors::CurrentUser,
    error::AppError,
    repos::{friend_repo, user_repo},
    state::AppState,
};

pub async fn me(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<FriendResponse>>, AppError> {
    let user_id = principal.require_id()?;
    let rows = friend_repo::list_for_user(&state.db, user_id).await?;
    Ok(Json(rows.into_iter().map(FriendResponse::from).collect()))
}

pub async fn add(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(friend_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let user_id = principal.require_id()?;

    if user_id == friend_id {
        return Err(AppError::bad_request("SELF_FRIEND", "cannot befriend yourself"));
    }

    // The friend must be a real user; FK alone would leak a 500.
    user_repo::find_by_id(&state.db, friend_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    friend_repo::add(&state.db, user_id, friend_id)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => AppError::conflict("ALREADY_FRIENDS", "already friends"),
            other => other,
        })?;

    Ok(StatusCode::CREATED)
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(friend_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let user_id = principal.require_id()?;

    let removed = friend_repo::remove(&state.db, user_id, friend_id).await?;
    if !removed {
        return Err(AppError::not_found("friend"));
    }

    Ok(StatusCode::NO_CONTENT)
}
