/*
 * Responsibility
 * - /api/sign 系 handler
 * - DTO validation → SignService 呼び出し → token cookie の付与
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};

use crate::{
    api::cookies::{clear_token_cookies, token_cookies},
    api::dto::sign::{
        ChangePasswordRequest, LoginRequest, LoginResponse, ProviderLoginRequest,
        ProviderRegisterRequest, RegisterRequest,
    },
    api::extractors::CurrentUser,
    error::AppError,
    services::auth::sign::TokenPair,
    state::AppState,
};

fn login_response(state: &AppState, pair: TokenPair) -> impl IntoResponse + use<> {
    let cookies = token_cookies(
        &pair.access_token,
        state.tokens.access_token_valid_seconds(),
        &pair.refresh_token,
        state.tokens.refresh_token_valid_seconds(),
        &state.cookies,
    );

    (
        cookies,
        Json(LoginResponse {
            user_id: pair.user_id,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
    )
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION", m))?;

    state
        .sign
        .register(&req.uid, &req.password, &req.username, &req.nickname)
        .await?;

    Ok(StatusCode::CREATED)
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION", m))?;

    let pair = state.sign.login(&req.uid, &req.password).await?;
    Ok(login_response(&state, pair))
}

pub async fn login_by_provider(
    State(state): State<AppState>,
    Json(req): Json<ProviderLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION", m))?;

    let pair = state.sign.login_by_provider(&req.provider, &req.uid).await?;
    Ok(login_response(&state, pair))
}

pub async fn register_by_provider(
    State(state): State<AppState>,
    Json(req): Json<ProviderRegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION", m))?;

    let pair = state
        .sign
        .register_by_provider(&req.provider, &req.uid, &req.username, &req.nickname)
        .await?;
    Ok(login_response(&state, pair))
}

/// The Authorization header carries the *refresh* token here.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let pair = state.sign.refresh_token(authorization).await?;
    Ok(login_response(&state, pair))
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let user_id = principal.require_id()?;
    state.sign.logout(user_id).await?;

    Ok((StatusCode::NO_CONTENT, clear_token_cookies(&state.cookies)))
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION", m))?;

    let user_id = principal.require_id()?;
    state
        .sign
        .change_password(user_id, &req.old_password, &req.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
