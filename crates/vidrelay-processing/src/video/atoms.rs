//! Top-level MP4 box scanner.
//!
//! Only box headers are read; payloads are skipped with seeks, so scanning a multi-gigabyte
//! file costs a handful of small reads.

use std::io::{self, SeekFrom};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Header of one top-level box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    pub kind: [u8; 4],
    pub offset: u64,
    pub size: u64,
}

/// Relative order of the index and media data boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomLayout {
    /// `moov` precedes `mdat`
    Faststart,
    /// `mdat` precedes `moov`
    MoovAfterMdat,
    /// One of the two boxes is absent
    Incomplete,
}

pub fn layout_of(boxes: &[BoxHeader]) -> AtomLayout {
    let position = |kind: &[u8; 4]| boxes.iter().position(|b| &b.kind == kind);
    match (position(b"moov"), position(b"mdat")) {
        (Some(moov), Some(mdat)) if moov < mdat => AtomLayout::Faststart,
        (Some(_), Some(_)) => AtomLayout::MoovAfterMdat,
        _ => AtomLayout::Incomplete,
    }
}

/// Read every top-level box header in the file.
///
/// Stops at the first truncated header. A box with size 0 runs to end of file; a box that
/// claims to extend past end of file is reported and ends the scan.
pub async fn read_top_level_boxes(path: &Path) -> io::Result<Vec<BoxHeader>> {
    let mut file = File::open(path).await?;
    let file_len = file.metadata().await?.len();
    let mut boxes = Vec::new();
    let mut offset = 0u64;

    while offset.checked_add(8).is_some_and(|end| end <= file_len) {
        file.seek(SeekFrom::Start(offset)).await?;
        let mut header = [0u8; 8];
        file.read_exact(&mut header).await?;

        let short_size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
        let kind = [header[4], header[5], header[6], header[7]];

        let size = match short_size {
            0 => file_len - offset,
            1 => {
                if file_len - offset < 16 {
                    break;
                }
                let mut large = [0u8; 8];
                file.read_exact(&mut large).await?;
                u64::from_be_bytes(large)
            }
            n => n,
        };

        if size < 8 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("box at offset {} declares size {}", offset, size),
            ));
        }

        boxes.push(BoxHeader { kind, offset, size });
        match offset.checked_add(size) {
            Some(next) if next <= file_len => offset = next,
            _ => break,
        }
    }

    Ok(boxes)
}

pub async fn inspect_layout(path: &Path) -> io::Result<AtomLayout> {
    Ok(layout_of(&read_top_level_boxes(path).await?))
}
