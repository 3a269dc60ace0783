//! Administrative handlers

use axum::{
    extract::{Path, State},
    Json,
};
use quill_core::Role;
use tracing::info;

use crate::dto::RevokeSessionsResponse;
use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Revoke every live session of a user - POST /api/v1/admin/users/{username}/revoke-sessions
pub async fn revoke_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<RevokeSessionsResponse>>, ApiError> {
    auth.identity.require_role(Role::Admin)?;

    let user = state.manager.find_user(&username).await?;
    let revoked = state.manager.revoke_user_sessions(user.id).await?;

    info!(
        admin = %auth.identity.username,
        target = %username,
        revoked,
        "Forced session revocation"
    );
    Ok(Json(ApiResponse::success(RevokeSessionsResponse {
        username,
        revoked,
    })))
}
