use crate::error::{Result, TorrentError};

/// A 20-byte SHA1 hash identifying a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceHash([u8; 20]);

impl PieceHash {
    pub fn new(hash: [u8; 20]) -> Self {
        Self(hash)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != 20 {
            return Err(TorrentError::Layout(
                "Piece hash must be 20 bytes".to_string(),
            ));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(slice);
        Ok(Self(hash))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl AsRef<[u8]> for PieceHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Ordered collection of per-piece hashes
#[derive(Debug, Clone)]
pub struct Pieces {
    hashes: Vec<PieceHash>,
}

impl Pieces {
    /// Parse from concatenated 20-byte SHA1 digests
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() % 20 != 0 {
            return Err(TorrentError::Layout(
                "Pieces length must be a multiple of 20".to_string(),
            ));
        }

        let hashes = data
            .chunks_exact(20)
            .map(PieceHash::from_slice)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { hashes })
    }

    pub fn from_hashes(hashes: Vec<PieceHash>) -> Self {
        Self { hashes }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PieceHash> {
        self.hashes.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pieces_from_bytes() {
        let mut data = vec![1u8; 20];
        data.extend_from_slice(&[2u8; 20]);

        let pieces = Pieces::from_bytes(&data).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces.get(0).unwrap().as_bytes(), &[1u8; 20]);
        assert_eq!(pieces.get(1).unwrap().as_bytes(), &[2u8; 20]);
        assert!(pieces.get(2).is_none());
    }

    #[test]
    fn test_ragged_length_rejected() {
        assert!(Pieces::from_bytes(&[0u8; 21]).is_err());
    }
}
