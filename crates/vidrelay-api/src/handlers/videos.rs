//! Draft record endpoints

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use vidrelay_core::{AppError, NewVideo, VideoRecord};

const MAX_TITLE_LEN: usize = 255;

fn validate_new_video(new: &NewVideo) -> Result<(), AppError> {
    let title = new.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::InvalidInput(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "videos",
    request_body = NewVideo,
    responses(
        (status = 201, description = "Draft record created", body = VideoRecord),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(new): ValidatedJson<NewVideo>,
) -> Result<(StatusCode, Json<VideoRecord>), HttpAppError> {
    validate_new_video(&new)?;
    let new = NewVideo {
        title: new.title.trim().to_string(),
        ..new
    };

    let record = state.store.create(user.user_id, new).await?;
    tracing::info!(video_id = %record.id, user_id = %user.user_id, "Draft video created");
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video record ID")
    ),
    responses(
        (status = 200, description = "Video record", body = VideoRecord),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
) -> Result<Json<VideoRecord>, HttpAppError> {
    let id = Uuid::parse_str(&video_id)?;
    let record = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;

    if !record.is_owned_by(user.user_id) {
        return Err(AppError::Forbidden(format!("Video {} belongs to another user", id)).into());
    }

    Ok(Json(record))
}
