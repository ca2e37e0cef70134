//! Video inspection and container rewriting.
//!
//! Both external tools are invoked directly through `tokio::process::Command` (never a
//! shell) with `kill_on_drop` set, so dropping a request future also stops the child.

pub mod atoms;
pub mod faststart;
pub mod probe;

use anyhow::{anyhow, Result};

/// Validate that a tool path doesn't contain shell metacharacters or dangerous sequences
pub(crate) fn validate_tool_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(anyhow!("Tool path is empty"));
    }

    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }

    Ok(())
}
