// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LoginRequest, TokenPair};
use crate::state::AppState;

/// POST /auth/login - Authenticate and receive an access/refresh token pair
///
/// Expected Input:
/// ```json
/// { "email": "ada@example.com", "password": "..." }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "access_token": "eyJhbGciOiJIUzI1NiI...",
///     "token_type": "Bearer",
///     "expires_in": 3600,
///     "refresh_token": "5f0c...",
///     "user": { "id": 1, "email": "ada@example.com", "username": "ada", "role": "Member", ... }
///   }
/// }
/// ```
///
/// Unknown email and wrong password both answer 401 with the same message.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(request) = payload?;
    let pair = state.users.login(request, state.now()).await?;
    Ok(ApiResponse::success(pair))
}
