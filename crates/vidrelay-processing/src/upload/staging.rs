//! Staging inbound bytes to a private temp file.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::io::{self, SeekFrom};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

const STAGING_PREFIX: &str = "vidrelay-upload-";

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("upload exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("upload body is empty")]
    Empty,

    #[error("staging IO failed: {0}")]
    Io(#[from] io::Error),
}

/// A fully written upload on local disk.
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    handle: File,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Handle positioned at the start of the file.
    pub fn handle_mut(&mut self) -> &mut File {
        &mut self.handle
    }

    pub async fn rewind(&mut self) -> io::Result<()> {
        self.handle.seek(SeekFrom::Start(0)).await.map(|_| ())
    }
}

/// Copy `body` into a new temp file in `dir`, failing once more than `max_bytes` arrive.
pub async fn stage_stream<S>(
    dir: &Path,
    extension: &str,
    mut body: S,
    max_bytes: u64,
) -> Result<StagedFile, StagingError>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    let file = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(extension)
        .tempfile_in(dir)?;
    let mut handle = File::from_std(file.as_file().try_clone()?);

    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(StagingError::TooLarge { limit: max_bytes });
        }
        handle.write_all(&chunk).await?;
    }

    if written == 0 {
        return Err(StagingError::Empty);
    }

    handle.flush().await?;
    let mut staged = StagedFile {
        file,
        handle,
        size: written,
    };
    staged.rewind().await?;

    tracing::debug!(
        path = %staged.path().display(),
        size_bytes = written,
        "Upload staged"
    );

    Ok(staged)
}
