//! Data models shared across crates

mod video;

pub use video::{NewVideo, VideoRecord};
