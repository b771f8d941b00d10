use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::health::root))
        .route("/health", get(public::health::health))
        .route("/api/space-image", get(public::space_image::space_image_get))
        // Public auth routes
        .merge(auth_public_routes())
        // Protected API
        .merge(api_routes(state.clone()));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/refresh", post(auth::refresh_post))
}

fn api_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, celestial_objects, maps, users};

    Router::new()
        // Session management for authenticated users
        .route("/api/auth/whoami", get(auth::session_whoami))
        .route("/api/auth/logout", post(auth::session_logout))
        .route("/api/users/:id", axum::routing::delete(users::user_delete))
        // Celestial objects
        .route(
            "/api/celestial-objects",
            get(celestial_objects::list_own).post(celestial_objects::post),
        )
        .route("/api/celestial-objects/public", get(celestial_objects::list_public))
        .route(
            "/api/celestial-objects/:id",
            get(celestial_objects::get)
                .put(celestial_objects::put)
                .delete(celestial_objects::delete),
        )
        // Maps
        .route("/api/maps", get(maps::list_own).post(maps::post))
        .route("/api/maps/public", get(maps::list_public))
        .route(
            "/api/maps/:id",
            get(maps::get).put(maps::put).delete(maps::delete),
        )
        .route(
            "/api/maps/:id/celestial-objects/:object_id",
            post(maps::link).delete(maps::unlink),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
