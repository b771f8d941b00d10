// handlers/public/space_image.rs - GET /api/space-image

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::SpaceImage;
use crate::state::AppState;

/// Today's picture, fetched upstream at most once per UTC day
pub async fn space_image_get(State(state): State<AppState>) -> ApiResult<SpaceImage> {
    let image = state.space_images.image_of_the_day(state.now()).await?;
    Ok(ApiResponse::success(image))
}
