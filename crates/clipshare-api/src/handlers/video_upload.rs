use crate::auth::models::PrincipalContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::VideoUploadService;
use crate::state::AppState;
use crate::utils::base_url::RequestBaseUrl;
use axum::{
    extract::{Multipart, State},
    Json,
};
use clipshare_core::models::VideoResponse;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "videos",
    responses(
        (status = 200, description = "Video uploaded successfully", body = VideoResponse),
        (status = 400, description = "Invalid or missing video file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Email not on allow-list", body = ErrorResponse),
        (status = 408, description = "Upload timed out", body = ErrorResponse),
        (status = 413, description = "File exceeds size ceiling", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    principal: PrincipalContext,
    RequestBaseUrl(base_url): RequestBaseUrl,
    multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let service = VideoUploadService::new(
        state.store.clone(),
        state.config.max_video_size_bytes as u64,
        state.config.upload_timeout,
    );

    let asset = service.upload(&principal.partition_key, multipart).await?;

    Ok(Json(VideoResponse::from_asset(
        &asset,
        &principal.partition_key,
        &base_url,
    )))
}
