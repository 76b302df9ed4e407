/*
 * Responsibility
 * - /api/messages 系 handler
 * - 送信/送信済み一覧/受信一覧 (keyset pagination)/削除
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    api::dto::messages::{MessagePageQuery, MessageResponse, SendMessageRequest},
    api::extractors::CurrentUser,
    error::AppError,
    repos::{message_repo, user_repo},
    state::AppState,
};

pub async fn send(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION", m))?;

    let sender_id = principal.require_id()?;

    user_repo::find_by_id(&state.db, req.receiver_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    let row = message_repo::create(&state.db, sender_id, req.receiver_id, &req.content).await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn sent(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(page): Query<MessagePageQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let user_id = principal.require_id()?;
    let rows =
        message_repo::sent(&state.db, user_id, page.last_message_id(), page.limit()).await?;
    Ok(Json(rows.into_iter().map(MessageResponse::from).collect()))
}

pub async fn received(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(page): Query<MessagePageQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let user_id = principal.require_id()?;
    let rows =
        message_repo::received(&state.db, user_id, page.last_message_id(), page.limit()).await?;
    Ok(Json(rows.into_iter().map(MessageResponse::from).collect()))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(message_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let user_id = principal.require_id()?;

    // Delete is scoped to the sender; someone else's message looks absent.
    let deleted = message_repo::delete(&state.db, message_id, user_id).await?;
    if !deleted {
        return Err(AppError::not_found("message"));
    }

    Ok(StatusCode::NO_CONTENT)
}
