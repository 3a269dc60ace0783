//! Authentication HTTP handlers (register, login, logout, me, sessions)

use axum::{extract::State, http::StatusCode, Json};
use quill_core::{AuthenticatedUser, UserInfo};

use crate::dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, SessionDto};
use crate::error::ApiError;
use crate::extract::{AuthUser, BearerToken, ClientMeta, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Register handler - POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let role = payload.parsed_role()?;
    let user = state
        .manager
        .register(&payload.username, &payload.password, role)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// Login handler - POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let result = state
        .manager
        .login(&payload.username, &payload.password, client)
        .await?;
    Ok(Json(ApiResponse::success(LoginResponse {
        token: result.token,
        token_type: "Bearer",
        expires_at: result.expires_at,
        user: result.user,
    })))
}

/// Logout handler - POST /api/v1/auth/logout
///
/// Takes the raw bearer token so an expired or already revoked token can
/// still be logged out.
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.manager.logout(&token).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Logged out successfully".to_string(),
    })))
}

/// Current identity - GET /api/v1/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<AuthenticatedUser>> {
    Json(ApiResponse::success(auth.identity))
}

/// Caller's live sessions - GET /api/v1/auth/sessions
pub async fn sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SessionDto>>>, ApiError> {
    let sessions = state
        .manager
        .active_sessions(auth.identity.user_id)
        .await?
        .into_iter()
        .map(|session| SessionDto::from_session(session, &auth.token))
        .collect();
    Ok(Json(ApiResponse::success(sessions)))
}
