//! Route configuration and setup

use crate::api_doc;
use crate::auth::AuthState;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>, auth_state: AuthState) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&state)?;

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route(
            "/share/{partition_key}/{filename}",
            get(handlers::share_page::share_page),
        )
        .route(
            "/uploads/{partition_key}/{filename}",
            get(handlers::video_stream::stream_video),
        )
        .route("/api/openapi.json", get(api_doc::openapi_spec));

    // Protected routes (require a verified, allow-listed principal)
    let protected_routes = Router::new()
        .route("/api/upload", post(handlers::video_upload::upload_video))
        .route("/api/videos", get(handlers::video_list::list_videos))
        .route(
            "/api/videos/{filename}",
            delete(handlers::video_delete::delete_video),
        )
        .layer(axum::middleware::from_fn_with_state(
            Arc::new(auth_state),
            crate::auth::middleware::auth_middleware,
        ));

    // The transport-level body limit sits one MiB above the per-file ceiling
    // so the streaming byte counter inside the store reports 413 with a clear
    // message instead of the connection being cut mid-request.
    let body_limit = state.config.max_video_size_bytes + 1024 * 1024;

    let app = public_routes
        .merge(protected_routes)
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(state: &Arc<AppState>) -> Result<CorsLayer, anyhow::Error> {
    let cors = if state.config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> = state
            .config
            .cors_origins
            .iter()
            .map(|o| o.parse())
            .collect();

        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
