/*
 * Responsibility
 * - /api/rooms 系 handler
 * - 一覧/取得は public、作成は認証必須 (matrix 側で担保)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::dto::rooms::{CreateRoomRequest, RoomResponse},
    api::extractors::CurrentUser,
    error::AppError,
    repos::room_repo,
    state::AppState,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<RoomResponse>>, AppError> {
    let rows = room_repo::list(&state.db).await?;
    Ok(Json(rows.into_iter().map(RoomResponse::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomResponse>, AppError> {
    let row = room_repo::get(&state.db, room_id)
        .await?
        .ok_or_else(|| AppError::not_found("room"))?;

    Ok(Json(row.into()))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION", m))?;

    let owner_id = principal.require_id()?;
    let row = room_repo::create(&state.db, owner_id, &req.title).await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}
