use crate::auth::models::PrincipalContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/videos/{filename}",
    tag = "videos",
    params(
        ("filename" = String, Path, description = "Filename as returned by the catalog")
    ),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Email not on allow-list", body = ErrorResponse),
        (status = 404, description = "No such video in the caller's partition", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    principal: PrincipalContext,
    Path(filename): Path<String>,
) -> Result<StatusCode, HttpAppError> {
    state
        .store
        .delete(&principal.partition_key, &filename)
        .await?;

    tracing::info!(
        partition_key = %principal.partition_key,
        filename = %filename,
        "Video deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
