// handlers/public/health.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Starmap API",
            "version": version,
            "description": "Celestial catalog backend: maps, stars and planets",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/register, /auth/login, /auth/refresh (public - token acquisition)",
                "auth": "/api/auth/whoami, /api/auth/logout (protected)",
                "users": "/api/users/:id (protected)",
                "celestial_objects": "/api/celestial-objects[/public|/:id] (protected, reads accept anonymous)",
                "maps": "/api/maps[/public|/:id] (protected, reads accept anonymous)",
                "linkage": "/api/maps/:id/celestial-objects/:object_id (protected)",
                "space_image": "/api/space-image (public)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = state.now();

    match state.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
