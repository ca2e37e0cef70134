use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::upload::upload_from_multipart;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use vidrelay_core::VideoRecord;

#[utoipa::path(
    post,
    path = "/api/thumbnails/{video_id}/upload",
    tag = "thumbnails",
    params(
        ("video_id" = Uuid, Path, description = "Video record ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Form with a `thumbnail` file part"),
    responses(
        (status = 200, description = "Thumbnail published", body = VideoRecord),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported content type", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.user_id))]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<VideoRecord>, HttpAppError> {
    let record =
        upload_from_multipart(&state.thumbnail_pipeline, user, &video_id, multipart).await?;
    Ok(Json(record))
}
