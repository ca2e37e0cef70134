//! Vidrelay Database Layer
//!
//! Postgres-backed implementation of the video metadata store, plus the pool and
//! migration bootstrap used by the API at startup.

pub mod db;

pub use db::{connect_and_migrate, VideoRepository};
