use crate::error::{ErrorResponse, HttpAppError};
use crate::services::share::render_share_page;
use crate::state::AppState;
use crate::utils::base_url::RequestBaseUrl;
use axum::{
    extract::{Path, State},
    response::Html,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/share/{partition_key}/{filename}",
    tag = "public",
    params(
        ("partition_key" = String, Path, description = "Owner's partition key"),
        ("filename" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "Share page with OpenGraph preview metadata", content_type = "text/html"),
        (status = 404, description = "No such video", body = ErrorResponse)
    )
)]
pub async fn share_page(
    State(state): State<Arc<AppState>>,
    RequestBaseUrl(base_url): RequestBaseUrl,
    Path((partition_key, filename)): Path<(String, String)>,
) -> Result<Html<String>, HttpAppError> {
    // 404 before rendering so dead links never produce a player page.
    let asset = state.store.stat(&partition_key, &filename).await?;

    let video_url = format!("{}/uploads/{}/{}", base_url, partition_key, asset.filename);
    Ok(Html(render_share_page(&asset.filename, &video_url)))
}
