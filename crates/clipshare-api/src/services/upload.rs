//! Video upload service
//!
//! Pulls the `video` part out of a multipart body, validates that it is
//! plausibly a video, and streams it into the caller's partition without
//! buffering the payload in memory. The whole ingestion runs under a
//! deadline; a timed-out upload leaves no partial file behind because the
//! store stages writes in a temp file until the final rename.

use crate::error::storage_error_to_app;
use axum::extract::multipart::Multipart;
use clipshare_core::models::VideoAsset;
use clipshare_core::validation::validate_video_kind;
use clipshare_core::AppError;
use clipshare_storage::PartitionStore;
use std::sync::Arc;
use std::time::Duration;

pub struct VideoUploadService {
    store: Arc<PartitionStore>,
    max_bytes: u64,
    timeout: Duration,
}

impl VideoUploadService {
    pub fn new(store: Arc<PartitionStore>, max_bytes: u64, timeout: Duration) -> Self {
        Self {
            store,
            max_bytes,
            timeout,
        }
    }

    /// Ingest the first `video` part of the request into `partition_key`.
    #[tracing::instrument(skip(self, multipart), fields(partition_key = %partition_key))]
    pub async fn upload(
        &self,
        partition_key: &str,
        mut multipart: Multipart,
    ) -> Result<VideoAsset, AppError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
        {
            if field.name() != Some("video") {
                continue;
            }

            let original_filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let extension = validate_video_kind(&original_filename, &content_type)?;

            tracing::info!(
                original_filename = %original_filename,
                content_type = %content_type,
                extension = %extension,
                "Starting video ingestion"
            );

            // Adapt the field into a byte stream; Box::pin gives us Unpin.
            let stream = Box::pin(futures::stream::try_unfold(field, |mut field| async move {
                match field.chunk().await {
                    Ok(Some(bytes)) => Ok(Some((bytes, field))),
                    Ok(None) => Ok(None),
                    Err(e) => Err(e),
                }
            }));

            let asset = tokio::time::timeout(
                self.timeout,
                self.store
                    .ingest_stream(partition_key, &extension, self.max_bytes, stream),
            )
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "Upload did not complete within {} seconds",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(storage_error_to_app)?;

            tracing::info!(
                filename = %asset.filename,
                size = asset.size,
                "Video ingested"
            );
            return Ok(asset);
        }

        Err(AppError::NoFileProvided)
    }
}
