//! Faststart remux: moves the `moov` index in front of the media data so players can start
//! before the whole file has downloaded.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempPath;
use thiserror::Error;
use tokio::process::Command;

use super::validate_tool_path;

const OUTPUT_SUFFIX: &str = ".processing";

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("failed to launch ffmpeg: {0}")]
    Launch(#[source] std::io::Error),

    #[error("ffmpeg exited unsuccessfully (code {code:?})")]
    Exit { code: Option<i32>, stderr: String },

    #[error("ffmpeg reported success but wrote no output at {0}")]
    MissingOutput(PathBuf),
}

/// Output of a rewrite. The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct RewrittenFile {
    path: TempPath,
}

impl RewrittenFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `<input>.processing`, next to the input.
pub fn output_path_for(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(OUTPUT_SUFFIX);
    PathBuf::from(name)
}

#[async_trait]
pub trait ContainerRewriter: Send + Sync {
    /// Write a faststart copy of `input`. The input itself is left untouched.
    async fn rewrite(&self, input: &Path) -> Result<RewrittenFile, RewriteError>;
}

/// Runs `ffmpeg -c copy -movflags faststart` as a child process.
#[derive(Debug, Clone)]
pub struct FfmpegRewriter {
    ffmpeg_path: String,
}

impl FfmpegRewriter {
    pub fn new(ffmpeg_path: impl Into<String>) -> Result<Self> {
        let ffmpeg_path = ffmpeg_path.into();
        validate_tool_path(&ffmpeg_path).context("Invalid ffmpeg_path")?;
        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl ContainerRewriter for FfmpegRewriter {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn rewrite(&self, input: &Path) -> Result<RewrittenFile, RewriteError> {
        let start = std::time::Instant::now();
        let output_path = output_path_for(input);
        // Guard first so partial output is removed on failure and on cancellation.
        let guard = TempPath::from_path(&output_path);

        let output = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(RewriteError::Launch)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(
                exit_code = ?output.status.code(),
                stderr = %stderr,
                "ffmpeg faststart failed"
            );
            return Err(RewriteError::Exit {
                code: output.status.code(),
                stderr,
            });
        }

        if !tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            return Err(RewriteError::MissingOutput(output_path));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            output = %output_path.display(),
            "Faststart rewrite completed"
        );

        Ok(RewrittenFile { path: guard })
    }
}

/// Copies the input verbatim to the output path. Stands in for ffmpeg in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyRewriter;

#[async_trait]
impl ContainerRewriter for CopyRewriter {
    async fn rewrite(&self, input: &Path) -> Result<RewrittenFile, RewriteError> {
        let output_path = output_path_for(input);
        let guard = TempPath::from_path(&output_path);
        tokio::fs::copy(input, &output_path)
            .await
            .map_err(RewriteError::Launch)?;
        Ok(RewrittenFile { path: guard })
    }
}

/// Always fails as if ffmpeg exited non-zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRewriter;

#[async_trait]
impl ContainerRewriter for FailingRewriter {
    async fn rewrite(&self, _input: &Path) -> Result<RewrittenFile, RewriteError> {
        Err(RewriteError::Exit {
            code: Some(1),
            stderr: "Invalid data found when processing input".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_output_path_appends_suffix() {
        assert_eq!(
            output_path_for(Path::new("/tmp/vidrelay-upload-abc.mp4")),
            PathBuf::from("/tmp/vidrelay-upload-abc.mp4.processing")
        );
    }

    #[tokio::test]
    async fn test_copy_rewriter_output_is_removed_on_drop() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        tokio::fs::write(&input, b"bytes").await.unwrap();

        let rewritten = CopyRewriter.rewrite(&input).await.unwrap();
        let out = rewritten.path().to_path_buf();
        assert_eq!(tokio::fs::read(&out).await.unwrap(), b"bytes");

        drop(rewritten);
        assert!(!out.exists());
        assert!(input.exists());
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_is_launch_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        tokio::fs::write(&input, b"bytes").await.unwrap();

        let rewriter = FfmpegRewriter::new("/nonexistent/bin/ffmpeg").unwrap();
        let result = rewriter.rewrite(&input).await;
        assert!(matches!(result, Err(RewriteError::Launch(_))));
        assert!(!output_path_for(&input).exists());
    }

    #[tokio::test]
    async fn test_failing_rewriter() {
        let result = FailingRewriter.rewrite(Path::new("in.mp4")).await;
        assert!(matches!(result, Err(RewriteError::Exit { code: Some(1), .. })));
    }
}
