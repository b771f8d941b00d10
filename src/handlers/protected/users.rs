// handlers/protected/users.rs - DELETE /api/users/:id

use axum::extract::{Path, State};

use crate::database::models::UserId;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// Delete an account with everything it owns. Self or Administrator only.
pub async fn user_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<UserId>,
) -> ApiResult<()> {
    state.users.delete(id, user.user_id, user.role).await?;
    Ok(ApiResponse::<()>::no_content())
}
