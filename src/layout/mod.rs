mod piece;

pub use piece::{PieceHash, Pieces};

use crate::error::{Result, TorrentError};
use std::path::PathBuf;

/// A single file within the torrent content
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Path relative to the download root
    pub path: PathBuf,
    pub length: u64,
}

/// Immutable description of how the torrent content maps onto pieces and
/// files. Produced by an external metadata parser; read-only for the
/// lifetime of a download session.
#[derive(Debug, Clone)]
pub struct TorrentLayout {
    /// Number of bytes in each piece (the last piece may be shorter)
    piece_length: u64,
    /// Total length of all files
    total_length: u64,
    /// Files in torrent order
    files: Vec<FileInfo>,
    /// SHA1 hashes, one per piece
    piece_hashes: Pieces,
}

impl TorrentLayout {
    pub fn new(
        piece_length: u64,
        total_length: u64,
        files: Vec<FileInfo>,
        piece_hashes: Pieces,
    ) -> Result<Self> {
        if piece_length == 0 {
            return Err(TorrentError::Layout("Piece length must be non-zero".to_string()));
        }

        // A zero-byte torrent has no pieces; piece arithmetic assumes at
        // least one.
        if total_length == 0 {
            return Err(TorrentError::Layout(
                "Total length must be non-zero".to_string(),
            ));
        }

        let file_total: u64 = files.iter().map(|f| f.length).sum();
        if file_total != total_length {
            return Err(TorrentError::Layout(format!(
                "File lengths sum to {} but total length is {}",
                file_total, total_length
            )));
        }

        let expected_pieces = ((total_length + piece_length - 1) / piece_length) as usize;
        if piece_hashes.len() != expected_pieces {
            return Err(TorrentError::Layout(format!(
                "Expected {} piece hashes, got {}",
                expected_pieces,
                piece_hashes.len()
            )));
        }

        Ok(Self {
            piece_length,
            total_length,
            files,
            piece_hashes,
        })
    }

    pub fn piece_length(&self) -> u64 {
        self.piece_length
    }

    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    pub fn files(&self) -> &[FileInfo] {
        &self.files
    }

    pub fn num_pieces(&self) -> usize {
        self.piece_hashes.len()
    }

    /// Effective length of a piece: `piece_length` for all but the final
    /// index, where only the remainder of the content is covered.
    pub fn piece_length_for(&self, index: usize) -> u64 {
        if index == self.num_pieces() - 1 {
            self.total_length - self.piece_length * (self.num_pieces() as u64 - 1)
        } else {
            self.piece_length
        }
    }

    pub fn piece_hash(&self, index: usize) -> Option<&PieceHash> {
        self.piece_hashes.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashes(n: usize) -> Pieces {
        Pieces::from_bytes(&vec![0u8; 20 * n]).unwrap()
    }

    #[test]
    fn test_last_piece_length() {
        let layout = TorrentLayout::new(
            16384,
            40000,
            vec![FileInfo {
                path: PathBuf::from("a.bin"),
                length: 40000,
            }],
            hashes(3),
        )
        .unwrap();

        assert_eq!(layout.num_pieces(), 3);
        assert_eq!(layout.piece_length_for(0), 16384);
        assert_eq!(layout.piece_length_for(1), 16384);
        assert_eq!(layout.piece_length_for(2), 7232);
    }

    #[test]
    fn test_exact_multiple_last_piece() {
        let layout = TorrentLayout::new(
            1024,
            4096,
            vec![FileInfo {
                path: PathBuf::from("a.bin"),
                length: 4096,
            }],
            hashes(4),
        )
        .unwrap();

        assert_eq!(layout.piece_length_for(3), 1024);
    }

    #[test]
    fn test_empty_torrent_rejected() {
        let result = TorrentLayout::new(1024, 0, Vec::new(), hashes(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_sum_mismatch_rejected() {
        let result = TorrentLayout::new(
            1024,
            2000,
            vec![FileInfo {
                path: PathBuf::from("a.bin"),
                length: 1999,
            }],
            hashes(2),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_hash_count_mismatch_rejected() {
        let result = TorrentLayout::new(
            1024,
            2048,
            vec![FileInfo {
                path: PathBuf::from("a.bin"),
                length: 2048,
            }],
            hashes(3),
        );
        assert!(result.is_err());
    }
}
