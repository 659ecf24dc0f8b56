// ============================
// visionassist-backend/src/router.rs
// ============================
//! HTTP router: every route lives under `/api`.
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, health, history, users};
use crate::middleware::rate_limit;
use crate::storage::Storage;
use crate::AppState;

/// Create the API router
pub fn create_router<S: Storage + 'static>(state: Arc<AppState<S>>) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register::<S>))
        .route("/auth/login", post(auth::login::<S>))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/users/profile",
            get(users::get_profile::<S>).put(users::update_profile::<S>),
        )
        .route(
            "/history",
            get(history::list_history::<S>).post(history::create_history::<S>),
        )
        .route("/health", get(health::health::<S>))
        .layer(from_fn_with_state(state.clone(), rate_limit::<S>));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.settings.cors_origins))
        .with_state(state)
}

/// CORS for the configured browser origins; origins were checked by `Settings::validate`
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
