use crate::error::{Result, TorrentError};
use crate::layout::TorrentLayout;
use crate::mapper::PieceRange;
use crate::storage::SliceStore;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

/// Read a whole piece from disk and compare its SHA1 digest against the
/// layout's stored hash.
///
/// A mismatch is not an error: `Ok(false)` tells the caller to re-request
/// the piece. Only I/O failure during the read is an `Err`.
pub async fn check_piece(
    store: &SliceStore,
    layout: &TorrentLayout,
    index: usize,
) -> Result<bool> {
    let expected = layout
        .piece_hash(index)
        .ok_or_else(|| TorrentError::Layout(format!("No hash for piece {}", index)))?;

    let mut buf = vec![0u8; layout.piece_length_for(index) as usize];
    store
        .read_slice(layout, PieceRange::whole_piece(layout, index), &mut buf)
        .await?;

    let mut hasher = Sha1::new();
    hasher.update(&buf);
    let digest = hasher.finalize();

    if digest.as_slice() == expected.as_bytes() {
        debug!("Piece {} verified", index);
        Ok(true)
    } else {
        warn!("Piece {} failed hash verification", index);
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FileInfo, Pieces};
    use std::path::PathBuf;

    fn sha1_of(data: &[u8]) -> [u8; 20] {
        let mut hasher = Sha1::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    async fn seeded_store() -> (tempfile::TempDir, TorrentLayout, SliceStore, Vec<u8>) {
        // Two pieces of 1024 bytes plus a short 452-byte final piece,
        // spread over two files.
        let content: Vec<u8> = (0..2500u32).map(|i| (i % 251) as u8).collect();

        let hashes = [
            sha1_of(&content[0..1024]),
            sha1_of(&content[1024..2048]),
            sha1_of(&content[2048..2500]),
        ]
        .concat();

        let layout = TorrentLayout::new(
            1024,
            2500,
            vec![
                FileInfo {
                    path: PathBuf::from("x.bin"),
                    length: 1500,
                },
                FileInfo {
                    path: PathBuf::from("y.bin"),
                    length: 1000,
                },
            ],
            Pieces::from_bytes(&hashes).unwrap(),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let store = SliceStore::new(dir.path(), &layout).await.unwrap();

        for index in 0..layout.num_pieces() {
            let range = PieceRange::whole_piece(&layout, index);
            let start = index * 1024;
            store
                .write_slice(&layout, range, &content[start..start + range.length as usize])
                .await
                .unwrap();
        }

        (dir, layout, store, content)
    }

    #[tokio::test]
    async fn test_all_pieces_verify() {
        let (_dir, layout, store, _) = seeded_store().await;

        for index in 0..layout.num_pieces() {
            assert!(check_piece(&store, &layout, index).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_single_byte_corruption_detected() {
        let (_dir, layout, store, content) = seeded_store().await;

        // Flip one byte in the middle of piece 1.
        let mut corrupted = content[1024..2048].to_vec();
        corrupted[500] ^= 0xff;
        store
            .write_slice(&layout, PieceRange::new(1, 0, 1024), &corrupted)
            .await
            .unwrap();

        assert!(!check_piece(&store, &layout, 1).await.unwrap());
        // Neighbours are untouched.
        assert!(check_piece(&store, &layout, 0).await.unwrap());
        assert!(check_piece(&store, &layout, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_data_is_io_error() {
        let content: Vec<u8> = vec![0u8; 100];
        let layout = TorrentLayout::new(
            100,
            100,
            vec![FileInfo {
                path: PathBuf::from("z.bin"),
                length: 100,
            }],
            Pieces::from_bytes(&sha1_of(&content)).unwrap(),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let store = SliceStore::new(dir.path(), &layout).await.unwrap();

        assert!(check_piece(&store, &layout, 0).await.is_err());
    }
}
