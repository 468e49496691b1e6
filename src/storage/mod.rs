use crate::error::{Result, TorrentError};
use crate::layout::TorrentLayout;
use crate::mapper::{self, PieceRange};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info};

/// Reads and writes piece-space byte ranges by mapping them onto the
/// per-file slices they cover under a download root.
pub struct SliceStore {
    root: PathBuf,
}

impl SliceStore {
    /// Create the store, pre-creating the download directory tree for every
    /// file in the layout.
    pub async fn new<P: AsRef<Path>>(root: P, layout: &TorrentLayout) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;

        for file in layout.files() {
            if let Some(parent) = root.join(&file.path).parent() {
                fs::create_dir_all(parent).await?;
            }
        }

        info!(
            "Storage initialized at {:?}: {} files, {} bytes total",
            root,
            layout.files().len(),
            layout.total_length()
        );

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a piece-space range to disk. `data` must be exactly
    /// `range.length` bytes; consecutive mapped slices consume consecutive
    /// sub-ranges of it.
    pub async fn write_slice(
        &self,
        layout: &TorrentLayout,
        range: PieceRange,
        data: &[u8],
    ) -> Result<()> {
        if data.len() as u64 != range.length as u64 {
            return Err(TorrentError::Mapper(format!(
                "Data length {} does not match range length {}",
                data.len(),
                range.length
            )));
        }

        let mut offset = 0usize;
        for slice in mapper::map(layout, range)? {
            let path = self.root.join(&slice.path);
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&path)
                .await?;

            file.seek(std::io::SeekFrom::Start(slice.begin)).await?;
            file.write_all(&data[offset..offset + slice.length as usize])
                .await?;

            debug!(
                "Wrote {} bytes to {:?} at offset {}",
                slice.length, path, slice.begin
            );

            offset += slice.length as usize;
        }

        Ok(())
    }

    /// Read a piece-space range from disk into `buf`, which must be exactly
    /// `range.length` bytes.
    pub async fn read_slice(
        &self,
        layout: &TorrentLayout,
        range: PieceRange,
        buf: &mut [u8],
    ) -> Result<()> {
        if buf.len() as u64 != range.length as u64 {
            return Err(TorrentError::Mapper(format!(
                "Buffer length {} does not match range length {}",
                buf.len(),
                range.length
            )));
        }

        let mut offset = 0usize;
        for slice in mapper::map(layout, range)? {
            let path = self.root.join(&slice.path);
            let mut file = File::open(&path).await?;

            file.seek(std::io::SeekFrom::Start(slice.begin)).await?;
            file.read_exact(&mut buf[offset..offset + slice.length as usize])
                .await?;

            offset += slice.length as usize;
        }

        Ok(())
    }
}
