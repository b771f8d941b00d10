use axum::extract::State;

use crate::database::models::UserResponse;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/auth/whoami - Current user, loaded fresh from the store
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 1,
///     "email": "ada@example.com",
///     "username": "ada",
///     "role": "Member",
///     "created_at": "2025-01-01T00:00:00Z",
///     "modified_at": "2025-01-01T12:00:00Z"
///   }
/// }
/// ```
pub async fn whoami(State(state): State<AppState>, user: AuthUser) -> ApiResult<UserResponse> {
    let profile = state.users.profile(user.user_id).await?;
    Ok(ApiResponse::success(profile.sanitized()))
}

/// POST /api/auth/logout - Revoke the refresh token.
/// Access tokens stay valid until they expire.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> ApiResult<()> {
    state.users.logout(user.user_id, state.now()).await?;
    Ok(ApiResponse::<()>::no_content())
}
