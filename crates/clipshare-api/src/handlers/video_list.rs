use crate::auth::models::PrincipalContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::base_url::RequestBaseUrl;
use axum::{extract::State, Json};
use clipshare_core::models::VideoResponse;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Caller's videos, newest first", body = [VideoResponse]),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Email not on allow-list", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    principal: PrincipalContext,
    RequestBaseUrl(base_url): RequestBaseUrl,
) -> Result<Json<Vec<VideoResponse>>, HttpAppError> {
    let assets = state.store.list(&principal.partition_key).await?;

    let responses = assets
        .iter()
        .map(|asset| VideoResponse::from_asset(asset, &principal.partition_key, &base_url))
        .collect();

    Ok(Json(responses))
}
