mod init;

pub use init::init_telemetry;

/// `LOG_FORMAT=json` selects structured output.
pub fn json_requested() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
