/**
 * Router Configuration
 *
 * Combines the API routes with the cross-cutting layers:
 *
 * 1. API routes (auth, contacts, messaging)
 * 2. CORS restricted to the single configured origin
 * 3. Request tracing
 * 4. JSON 404 fallback
 */

use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::api_routes::configure_api_routes;
use crate::server::state::AppState;

async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "success": false, "error": "not found" })),
    )
}

/// CORS restricted to the one configured origin. A malformed origin value
/// disables cross-origin access entirely rather than opening it up.
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(AllowOrigin::exact(origin)),
        Err(_) => {
            tracing::warn!(
                "Invalid allowed origin '{}'; cross-origin requests disabled",
                allowed_origin
            );
            layer
        }
    }
}

/// Create the Axum router with all routes and layers configured.
pub fn create_router(state: AppState) -> Router<()> {
    let cors = cors_layer(&state.config.allowed_origin);

    let router = configure_api_routes(Router::new(), state.clone());

    router
        .fallback(fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
