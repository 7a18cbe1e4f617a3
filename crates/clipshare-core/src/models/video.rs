//! Video asset models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One stored upload plus its filesystem metadata. Assets are immutable once
/// written; they disappear through explicit delete or retention expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    pub filename: String,
    pub size: u64,
    /// Filesystem birth time (mtime where birth time is unavailable); the
    /// canonical "uploaded at" and retention clock.
    pub created_at: DateTime<Utc>,
}

/// API representation of an asset, returned by the upload and catalog
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub filename: String,
    pub size: u64,
    /// Direct byte-stream URL.
    pub video_url: String,
    /// Public share page with social-preview metadata.
    pub share_url: String,
    pub upload_time: DateTime<Utc>,
}

impl VideoResponse {
    /// Build the response for `asset` as seen from `base_url`
    /// (scheme://host, no trailing slash).
    pub fn from_asset(asset: &VideoAsset, partition_key: &str, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            filename: asset.filename.clone(),
            size: asset.size,
            video_url: format!("{}/uploads/{}/{}", base, partition_key, asset.filename),
            share_url: format!("{}/share/{}/{}", base, partition_key, asset.filename),
            upload_time: asset.created_at,
        }
    }
}
