// handlers/public/auth/refresh.rs - POST /auth/refresh handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{RefreshRequest, TokenPair};
use crate::state::AppState;

/// POST /auth/refresh - Trade a refresh token for a new pair
pub async fn refresh_post(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(request) = payload?;
    let pair = state
        .users
        .refresh(&request.refresh_token, state.now())
        .await?;
    Ok(ApiResponse::success(pair))
}
