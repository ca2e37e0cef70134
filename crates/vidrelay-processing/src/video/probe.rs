//! Geometry probing and aspect-ratio classification.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::process::Command;

use super::validate_tool_path;

const PORTRAIT_BAND: (f64, f64) = (0.55, 0.57);
const LANDSCAPE_BAND: (f64, f64) = (1.75, 1.80);

/// Aspect-ratio bucket a video is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectClassification {
    Landscape,
    Portrait,
    Other,
}

impl AspectClassification {
    /// Classify by width/height ratio. Only close matches to 16:9 and 9:16 get a label.
    pub fn from_dimensions(width: Option<u32>, height: Option<u32>) -> Result<Self, ProbeError> {
        let (w, h) = match (width, height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(ProbeError::InvalidDimensions { width, height }),
        };

        let ratio = w as f64 / h as f64;
        if (PORTRAIT_BAND.0..=PORTRAIT_BAND.1).contains(&ratio) {
            Ok(AspectClassification::Portrait)
        } else if (LANDSCAPE_BAND.0..=LANDSCAPE_BAND.1).contains(&ratio) {
            Ok(AspectClassification::Landscape)
        } else {
            Ok(AspectClassification::Other)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectClassification::Landscape => "landscape",
            AspectClassification::Portrait => "portrait",
            AspectClassification::Other => "other",
        }
    }
}

impl fmt::Display for AspectClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe output contains no streams")]
    NoStreamData,

    #[error("invalid stream dimensions (width: {width:?}, height: {height:?})")]
    InvalidDimensions {
        width: Option<u32>,
        height: Option<u32>,
    },

    #[error("failed to launch ffprobe: {0}")]
    Launch(#[source] std::io::Error),

    #[error("ffprobe exited unsuccessfully (code {code:?})")]
    Exit { code: Option<i32>, stderr: String },

    #[error("could not parse ffprobe output: {0}")]
    Unparseable(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Classify ffprobe's `-print_format json -show_streams` output by its first stream.
pub fn classify_probe_output(stdout: &[u8]) -> Result<AspectClassification, ProbeError> {
    let output: ProbeOutput = serde_json::from_slice(stdout).map_err(ProbeError::Unparseable)?;
    let stream = output.streams.first().ok_or(ProbeError::NoStreamData)?;
    AspectClassification::from_dimensions(stream.width, stream.height)
}

#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<AspectClassification, ProbeError>;
}

/// Runs ffprobe as a child process.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>) -> Result<Self> {
        let ffprobe_path = ffprobe_path.into();
        validate_tool_path(&ffprobe_path).context("Invalid ffprobe_path")?;
        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<AspectClassification, ProbeError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ProbeError::Launch)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(
                exit_code = ?output.status.code(),
                stderr = %stderr,
                "ffprobe failed"
            );
            return Err(ProbeError::Exit {
                code: output.status.code(),
                stderr,
            });
        }

        let classification = classify_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            classification = %classification,
            "Video probe completed"
        );

        Ok(classification)
    }
}

#[derive(Debug, Clone)]
enum StaticOutcome {
    Dimensions(Option<u32>, Option<u32>),
    NoStreams,
    Exit(String),
}

/// Prober returning a fixed answer, for tests and machines without ffprobe.
#[derive(Debug)]
pub struct StaticProber {
    outcome: StaticOutcome,
    calls: AtomicUsize,
}

impl StaticProber {
    fn with(outcome: StaticOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn dimensions(width: u32, height: u32) -> Self {
        Self::with(StaticOutcome::Dimensions(Some(width), Some(height)))
    }

    /// Dimensions as ffprobe would report them, including absent values.
    pub fn raw_dimensions(width: Option<u32>, height: Option<u32>) -> Self {
        Self::with(StaticOutcome::Dimensions(width, height))
    }

    pub fn no_streams() -> Self {
        Self::with(StaticOutcome::NoStreams)
    }

    /// Simulate a non-zero exit with the given stderr.
    pub fn failing(stderr: impl Into<String>) -> Self {
        Self::with(StaticOutcome::Exit(stderr.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProber for StaticProber {
    async fn probe(&self, _path: &Path) -> Result<AspectClassification, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            StaticOutcome::Dimensions(w, h) => AspectClassification::from_dimensions(*w, *h),
            StaticOutcome::NoStreams => Err(ProbeError::NoStreamData),
            StaticOutcome::Exit(stderr) => Err(ProbeError::Exit {
                code: Some(1),
                stderr: stderr.clone(),
            }),
        }
    }
}
