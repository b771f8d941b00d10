// handlers/protected/celestial_objects.rs - /api/celestial-objects[/public|/:id]

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};

use crate::database::models::{CelestialObject, CelestialObjectDraft, EntityId};
use crate::error::ApiError;
use crate::handlers::utils::PageQuery;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PagedResponse, PagedResult};
use crate::state::AppState;

/// GET /api/celestial-objects - objects owned by the caller
pub async fn list_own(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> PagedResult<CelestialObject> {
    let page = query.resolve(&state)?;
    let objects = state.celestial_objects.list_own(user.user_id, page).await?;
    Ok(PagedResponse(objects))
}

/// GET /api/celestial-objects/public
pub async fn list_public(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> PagedResult<CelestialObject> {
    let page = query.resolve(&state)?;
    let objects = state.celestial_objects.list_public(page).await?;
    Ok(PagedResponse(objects))
}

/// GET /api/celestial-objects/:id - public objects for anyone, private ones for the owner
pub async fn get(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<EntityId>,
) -> ApiResult<CelestialObject> {
    let viewer = user.map(|u| u.user_id);
    let object = state
        .celestial_objects
        .fetch(id, viewer)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Celestial object {} not found", id)))?;
    Ok(ApiResponse::success(object))
}

/// POST /api/celestial-objects
///
/// ```json
/// {
///   "type": "star",
///   "name": "Sol",
///   "description": "Our star",
///   "mass": 2e30, "temperature": 5778, "radius": 696340,
///   "brightness": 1, "star_type": "YellowDwarf",
///   "is_public": true
/// }
/// ```
pub async fn post(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CelestialObjectDraft>, JsonRejection>,
) -> ApiResult<CelestialObject> {
    let Json(draft) = payload?;
    let object = state
        .celestial_objects
        .create(draft, user.user_id, state.now())
        .await?;
    Ok(ApiResponse::created(object))
}

/// PUT /api/celestial-objects/:id - replace the mutable fields
pub async fn put(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
    payload: Result<Json<CelestialObjectDraft>, JsonRejection>,
) -> ApiResult<CelestialObject> {
    let Json(draft) = payload?;
    let object = state
        .celestial_objects
        .update(id, draft, user.user_id, state.now())
        .await?;
    Ok(ApiResponse::success(object))
}

/// DELETE /api/celestial-objects/:id - owner only
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<EntityId>,
) -> ApiResult<()> {
    state.celestial_objects.delete(id, user.user_id).await?;
    Ok(ApiResponse::<()>::no_content())
}
