// handlers/protected/maps.rs - /api/maps[/public|/:id] and map membership

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};

use crate::database::models::{EntityId, MapDraft, MapView};
use crate::error::ApiError;
use crate::handlers::utils::PageQuery;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PagedResponse, PagedResult};
use crate::state::AppState;

/// GET /api/maps - maps owned by the caller, with every member
pub async fn list_own(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> PagedResult<MapView> {
    let page = query.resolve(&state)?;
    let maps = state.maps.list_own(user.user_id, page).await?;
    Ok(PagedResponse(maps))
}

/// GET /api/maps/public - members pruned for the caller (or anonymous)
pub async fn list_public(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(query): Query<PageQuery>,
) -> PagedResult<MapView> {
    let page = query.resolve(&state)?;
    let maps = state
        .maps
        .list_public(page, user.map(|u| u.user_id))
        .await?;
    Ok(PagedResponse(maps))
}

/// GET /api/maps/:id
///
/// Owners see every member. Everyone else sees public members plus the
/// members they own, and only if the map itself is public.
pub async fn get(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<EntityId>,
) -> ApiResult<MapView> {
    let map = state
        .maps
        .fetch(id, user.map(|u| u.user_id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Map {} not found", id)))?;
    Ok(ApiResponse::success(map))
}

/// POST /api/maps - `{ "name": "Alpha", "is_public": false }`
pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<MapDraft>, JsonRejection>,
) -> ApiResult<MapView> {
    let Json(draft) = payload?;
    let map = state.maps.create(draft, user.user_id, state.now()).await?;
    Ok(ApiResponse::created(map))
}

/// PUT /api/maps/:id - an `owner_id` in the body must match the caller
pub async fn put(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
    payload: Result<Json<MapDraft>, JsonRejection>,
) -> ApiResult<MapView> {
    let Json(draft) = payload?;
    let map = state
        .maps
        .update(id, draft, user.user_id, state.now())
        .await?;
    Ok(ApiResponse::success(map))
}

/// DELETE /api/maps/:id - members are unlinked, not deleted
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> ApiResult<()> {
    state.maps.delete(id, user.user_id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// POST /api/maps/:id/celestial-objects/:object_id
pub async fn link(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, object_id)): Path<(EntityId, EntityId)>,
) -> ApiResult<MapView> {
    let map = state
        .maps
        .link_celestial_object(id, object_id, user.user_id, state.now())
        .await?;
    Ok(ApiResponse::success(map))
}

/// DELETE /api/maps/:id/celestial-objects/:object_id
pub async fn unlink(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, object_id)): Path<(EntityId, EntityId)>,
) -> ApiResult<MapView> {
    let map = state
        .maps
        .unlink_celestial_object(id, object_id, user.user_id, state.now())
        .await?;
    Ok(ApiResponse::success(map))
}
