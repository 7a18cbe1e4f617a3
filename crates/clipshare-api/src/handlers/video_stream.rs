use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use clipshare_core::constants::content_type_for_extension;
use clipshare_core::validation::file_extension;
use std::sync::Arc;

/// Raw byte stream for one stored video. Public by design: share links must
/// work without credentials, and the partition key plus timestamp filename is
/// the capability.
#[utoipa::path(
    get,
    path = "/uploads/{partition_key}/{filename}",
    tag = "public",
    params(
        ("partition_key" = String, Path, description = "Owner's partition key"),
        ("filename" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "Video bytes", content_type = "video/mp4"),
        (status = 404, description = "No such video", body = ErrorResponse)
    )
)]
pub async fn stream_video(
    State(state): State<Arc<AppState>>,
    Path((partition_key, filename)): Path<(String, String)>,
) -> Result<Response, HttpAppError> {
    let (asset, stream) = state.store.read_stream(&partition_key, &filename).await?;

    let content_type =
        content_type_for_extension(&file_extension(&asset.filename).unwrap_or_default());

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, asset.size)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(stream))
        .map_err(|e| anyhow::anyhow!("Failed to build stream response: {}", e))?;

    Ok(response)
}
