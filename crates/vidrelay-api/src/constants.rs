//! API constants

/// API path prefix
pub const API_PREFIX: &str = "/api";

/// Head-room on top of the file limit for multipart boundaries and the other form parts.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Timeout for each dependency check in `/health`
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;
