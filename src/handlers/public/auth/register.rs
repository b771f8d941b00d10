// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::database::models::UserResponse;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::RegisterRequest;
use crate::state::AppState;

/// POST /auth/register - Create a Member account
///
/// Input: `{ "email": "...", "username": "...", "password": "..." }`.
/// Answers 201 with the new user, 409 when the email is taken.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let Json(request) = payload?;
    let user = state.users.register(request, state.now()).await?;
    Ok(ApiResponse::created(user.sanitized()))
}
