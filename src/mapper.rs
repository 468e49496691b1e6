use crate::error::{Result, TorrentError};
use crate::layout::TorrentLayout;
use std::path::PathBuf;

/// A contiguous byte range in piece-space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceRange {
    /// Piece index
    pub index: u32,
    /// Byte offset within the piece
    pub begin: u32,
    /// Length of the range
    pub length: u32,
}

impl PieceRange {
    pub fn new(index: u32, begin: u32, length: u32) -> Self {
        Self {
            index,
            begin,
            length,
        }
    }

    /// The full extent of one piece
    pub fn whole_piece(layout: &TorrentLayout, index: usize) -> Self {
        Self {
            index: index as u32,
            begin: 0,
            length: layout.piece_length_for(index) as u32,
        }
    }
}

/// A contiguous byte range within one file on disk. Produced only by
/// [`map`]; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSlice {
    /// Path relative to the download root
    pub path: PathBuf,
    /// Byte offset within that file
    pub begin: u64,
    pub length: u64,
}

/// Convert a piece-space range into the file-space slices it covers.
///
/// The range is translated to torrent-global coordinates `[a, b)` and walked
/// against the cumulative file offsets. A range may span two or more files at
/// a boundary; all overlapping slices are returned in file order. Files with
/// no overlap are skipped and zero-length slices are never emitted.
pub fn map(layout: &TorrentLayout, range: PieceRange) -> Result<Vec<FileSlice>> {
    let index = range.index as usize;
    if index >= layout.num_pieces() {
        return Err(TorrentError::Mapper(format!(
            "Piece index {} out of range ({} pieces)",
            index,
            layout.num_pieces()
        )));
    }

    let piece_len = layout.piece_length_for(index);
    if range.begin as u64 + range.length as u64 > piece_len {
        return Err(TorrentError::Mapper(format!(
            "Range {}+{} exceeds piece {} length {}",
            range.begin, range.length, index, piece_len
        )));
    }

    if range.length == 0 {
        return Ok(Vec::new());
    }

    let a = range.index as u64 * layout.piece_length() + range.begin as u64;
    let b = a + range.length as u64;

    let mut slices = Vec::new();
    let mut file_start = 0u64;

    for file in layout.files() {
        let file_end = file_start + file.length;

        // A zero-length file inside [a, b) overlaps nothing.
        if file.length > 0 && file_end > a && file_start < b {
            let begin = a.max(file_start) - file_start;
            let length = b.min(file_end) - a.max(file_start);
            slices.push(FileSlice {
                path: file.path.clone(),
                begin,
                length,
            });
        }

        file_start = file_end;
        if file_start >= b {
            break;
        }
    }

    Ok(slices)
}

/// Each file's `[begin, end)` span in torrent-global coordinates
pub fn file_list(layout: &TorrentLayout) -> Vec<(PathBuf, u64, u64)> {
    let mut entries = Vec::with_capacity(layout.files().len());
    let mut offset = 0u64;

    for file in layout.files() {
        entries.push((file.path.clone(), offset, offset + file.length));
        offset += file.length;
    }

    entries
}
