//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use vidrelay_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidrelay API",
        version = "0.1.0",
        description = "Uploads videos and thumbnails, makes videos streamable and publishes them to object storage"
    ),
    paths(
        handlers::videos::create_video,
        handlers::videos::get_video,
        handlers::video_upload::upload_video,
        handlers::thumbnail_upload::upload_thumbnail,
    ),
    components(schemas(models::VideoRecord, models::NewVideo, error::ErrorResponse)),
    modifiers(&BearerAuth),
    tags(
        (name = "videos", description = "Video records and video uploads"),
        (name = "thumbnails", description = "Thumbnail uploads")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_upload_paths() {
        let spec = ApiDoc::openapi();
        let paths = &spec.paths.paths;
        assert!(paths.contains_key("/api/videos"));
        assert!(paths.contains_key("/api/videos/{video_id}"));
        assert!(paths.contains_key("/api/videos/{video_id}/upload"));
        assert!(paths.contains_key("/api/thumbnails/{video_id}/upload"));
    }
}
