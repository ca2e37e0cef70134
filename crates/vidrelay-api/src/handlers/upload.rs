//! Multipart plumbing shared by the video and thumbnail upload endpoints.

use crate::auth::AuthUser;
use crate::error::HttpAppError;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use futures::{StreamExt, TryStreamExt};
use std::io;
use uuid::Uuid;
use vidrelay_core::{AppError, VideoRecord};
use vidrelay_processing::{UploadPipeline, UploadRequest};

/// Content type assumed when the file part carries none; no allow-list accepts it.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

fn multipart_error(err: MultipartError) -> HttpAppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        HttpAppError(AppError::PayloadTooLarge(err.body_text()))
    } else {
        HttpAppError(AppError::BadRequest(format!(
            "Malformed multipart body: {}",
            err.body_text()
        )))
    }
}

/// Find the pipeline's form field and stream it through the pipeline.
///
/// Other parts are skipped. The file part is never buffered in memory: its chunks go straight
/// to the staging file.
pub(crate) async fn upload_from_multipart(
    pipeline: &UploadPipeline,
    user: AuthUser,
    video_id: &str,
    mut multipart: Multipart,
) -> Result<VideoRecord, HttpAppError> {
    let record_id = Uuid::parse_str(video_id)?;
    let field_name = pipeline.variant().field;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(field_name) {
            tracing::debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let body = field.map_err(io::Error::other).boxed();

        let outcome = pipeline
            .process(UploadRequest {
                record_id,
                principal: user.user_id,
                body,
                content_type,
                // The request Content-Length covers the whole form, not this part
                declared_length: None,
            })
            .await?;
        return Ok(outcome.record);
    }

    Err(HttpAppError(AppError::BadRequest(format!(
        "Missing '{}' field in multipart form",
        field_name
    ))))
}
