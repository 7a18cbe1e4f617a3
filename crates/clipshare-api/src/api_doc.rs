//! OpenAPI documentation.

use crate::error::ErrorResponse;
use crate::handlers;
use axum::Json;
use clipshare_core::models::VideoResponse;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clipshare API",
        version = "0.1.0",
        description = "Personal video clip sharing service. Authenticated users upload clips into their own partition, list and delete them, and hand out public share links that unfurl a playable preview in chat clients. Clips expire automatically after the retention window."
    ),
    paths(
        handlers::video_upload::upload_video,
        handlers::video_list::list_videos,
        handlers::video_delete::delete_video,
        handlers::video_stream::stream_video,
        handlers::share_page::share_page,
        handlers::health::health_check,
    ),
    components(schemas(VideoResponse, ErrorResponse, handlers::health::HealthResponse)),
    modifiers(&BearerAuth),
    tags(
        (name = "videos", description = "Authenticated video management"),
        (name = "public", description = "Unauthenticated share and streaming endpoints"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
