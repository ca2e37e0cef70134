pub mod thumbnail_upload;
mod upload;
pub mod video_upload;
pub mod videos;
