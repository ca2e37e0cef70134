mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::auth::{mint_token, TestUser};
use helpers::{setup_test_app, setup_test_app_with, ASSETS_BASE_URL, CDN};
use serde_json::{json, Value};
use uuid::Uuid;
use vidrelay_core::{VideoRecord, VideoStore};
use vidrelay_processing::StaticProber;

const MP4_BYTES: &[u8] = b"\x00\x00\x00\x18ftypisom\x00\x00\x02\x00isomiso2 pretend video";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n pretend thumbnail";

fn file_form(field: &str, bytes: &[u8], file_name: &str, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        field,
        Part::bytes(bytes.to_vec())
            .file_name(file_name)
            .mime_type(mime),
    )
}

#[tokio::test]
async fn test_health_reports_all_dependencies() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "healthy");
    assert_eq!(body["video_storage"], "healthy");
    assert_eq!(body["thumbnail_storage"], "healthy");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/videos")
        .json(&json!({ "title": "no token" }))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_expired_and_malformed_tokens_are_unauthorized() {
    let app = setup_test_app().await;
    let expired = mint_token(Uuid::new_v4(), -120);

    for header in [
        format!("Bearer {}", expired),
        "Bearer not-a-jwt".to_string(),
        "Basic dXNlcjpwYXNz".to_string(),
    ] {
        let response = app
            .client()
            .get(&format!("/api/videos/{}", Uuid::new_v4()))
            .add_header("Authorization", header)
            .await;
        assert_eq!(response.status_code(), 401);
    }
}

#[tokio::test]
async fn test_create_and_fetch_draft() {
    let app = setup_test_app().await;
    let user = TestUser::new();

    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", user.bearer())
        .json(&json!({ "title": "  first cut  ", "description": "rough" }))
        .await;

    assert_eq!(response.status_code(), 201);
    let created: VideoRecord = response.json();
    assert_eq!(created.user_id, user.id);
    assert_eq!(created.title, "first cut");
    assert!(created.video_url.is_none());

    let response = app
        .client()
        .get(&format!("/api/videos/{}", created.id))
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(response.status_code(), 200);
    let fetched: VideoRecord = response.json();
    assert_eq!(fetched.id, created.id);
}

#[tokio::test]
async fn test_create_draft_rejects_blank_title() {
    let app = setup_test_app().await;
    let user = TestUser::new();

    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", user.bearer())
        .json(&json!({ "title": "   " }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_get_video_errors() {
    let app = setup_test_app().await;
    let owner = TestUser::new();
    let stranger = TestUser::new();
    let video = app.seed_video(owner.id).await;

    let response = app
        .client()
        .get(&format!("/api/videos/{}", video.id))
        .add_header("Authorization", stranger.bearer())
        .await;
    assert_eq!(response.status_code(), 403);

    let response = app
        .client()
        .get(&format!("/api/videos/{}", Uuid::new_v4()))
        .add_header("Authorization", owner.bearer())
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .client()
        .get("/api/videos/not-a-uuid")
        .add_header("Authorization", owner.bearer())
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_video_upload_publishes_under_classification() {
    let app = setup_test_app().await;
    let user = TestUser::new();
    let video = app.seed_video(user.id).await;

    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("video", MP4_BYTES, "clip.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 200);
    let record: VideoRecord = response.json();
    let url = record.video_url.clone().expect("video_url set");
    let prefix = format!("{}/landscape/", CDN);
    assert!(url.starts_with(&prefix), "unexpected url {url}");
    assert!(url.ends_with(".mp4"));

    let key = url.trim_start_matches(&format!("{}/", CDN));
    let published = std::fs::read(app.objects.join(key)).expect("published object");
    assert_eq!(published, MP4_BYTES);

    let stored = app.store.get(video.id).await.unwrap().unwrap();
    assert_eq!(stored.video_url.as_deref(), Some(url.as_str()));
    assert_eq!(app.staging_entries(), 0);
}

#[tokio::test]
async fn test_portrait_video_upload() {
    let app = setup_test_app_with(StaticProber::dimensions(1080, 1920), 64 * 1024).await;
    let user = TestUser::new();
    let video = app.seed_video(user.id).await;

    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(
            file_form("video", MP4_BYTES, "clip.mp4", "video/mp4").add_text("note", "ignored"),
        )
        .await;

    assert_eq!(response.status_code(), 200);
    let record: VideoRecord = response.json();
    assert!(record.video_url.unwrap().contains("/portrait/"));
}

#[tokio::test]
async fn test_non_owner_upload_is_forbidden() {
    let app = setup_test_app().await;
    let owner = TestUser::new();
    let stranger = TestUser::new();
    let video = app.seed_video(owner.id).await;

    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video.id))
        .add_header("Authorization", stranger.bearer())
        .multipart(file_form("video", MP4_BYTES, "clip.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["code"], "FORBIDDEN");

    let stored = app.store.get(video.id).await.unwrap().unwrap();
    assert_eq!(stored, video);
    assert_eq!(app.staging_entries(), 0);
}

#[tokio::test]
async fn test_probe_failure_hides_tool_output() {
    let app = setup_test_app_with(
        StaticProber::failing("/tmp/vidrelay-upload-x.mp4: moov atom not found"),
        64 * 1024,
    )
    .await;
    let user = TestUser::new();
    let video = app.seed_video(user.id).await;

    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("video", MP4_BYTES, "clip.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 422);
    let body: Value = response.json();
    assert_eq!(body["code"], "EXTERNAL_TOOL_FAILED");
    assert!(body.get("details").is_none());
    assert!(!response.text().contains("moov atom"));

    let stored = app.store.get(video.id).await.unwrap().unwrap();
    assert!(stored.video_url.is_none());
    assert_eq!(app.staging_entries(), 0);
}

#[tokio::test]
async fn test_upload_without_expected_field_is_bad_request() {
    let app = setup_test_app().await;
    let user = TestUser::new();
    let video = app.seed_video(user.id).await;

    let response = app
        .client()
        .post(&format!("/api/videos/{}/upload", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("file", MP4_BYTES, "clip.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_thumbnail_upload_is_served_from_assets() {
    let app = setup_test_app().await;
    let user = TestUser::new();
    let video = app.seed_video(user.id).await;

    let response = app
        .client()
        .post(&format!("/api/thumbnails/{}/upload", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("thumbnail", PNG_BYTES, "cover.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), 200);
    let record: VideoRecord = response.json();
    let url = record.thumbnail_url.expect("thumbnail_url set");
    assert!(url.starts_with(ASSETS_BASE_URL));
    assert!(url.ends_with(".png"));
    assert!(record.video_url.is_none());

    let key = url.trim_start_matches(&format!("{}/", ASSETS_BASE_URL));
    assert!(app.assets.join(key).exists());

    let served = app.client().get(&format!("/assets/{}", key)).await;
    assert_eq!(served.status_code(), 200);
    assert_eq!(served.as_bytes().as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn test_gif_thumbnail_is_unsupported() {
    let app = setup_test_app().await;
    let user = TestUser::new();
    let video = app.seed_video(user.id).await;

    let response = app
        .client()
        .post(&format!("/api/thumbnails/{}/upload", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("thumbnail", b"GIF89a", "cover.gif", "image/gif"))
        .await;

    assert_eq!(response.status_code(), 415);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert_eq!(std::fs::read_dir(&app.assets).unwrap().count(), 0);
    assert_eq!(app.staging_entries(), 0);
}

#[tokio::test]
async fn test_oversized_thumbnail_is_rejected() {
    let app = setup_test_app_with(StaticProber::dimensions(1920, 1080), 1024).await;
    let user = TestUser::new();
    let video = app.seed_video(user.id).await;
    let big = vec![0u8; 4096];

    let response = app
        .client()
        .post(&format!("/api/thumbnails/{}/upload", video.id))
        .add_header("Authorization", user.bearer())
        .multipart(file_form("thumbnail", &big, "cover.jpg", "image/jpeg"))
        .await;

    assert_eq!(response.status_code(), 413);
    let body: Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.staging_entries(), 0);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let spec: Value = response.json();
    assert!(spec["paths"]["/api/videos/{video_id}/upload"].is_object());
}
