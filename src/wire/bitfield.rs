/// Per-piece possession map, `ceil(npieces/8)` bytes, MSB-first: bit `7-j`
/// of byte `i` represents piece `8*i + j`. Trailing bits beyond the piece
/// count carry no meaning and are ignored by readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitfield {
    bytes: Vec<u8>,
}

impl Bitfield {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Build from explicit per-piece possession flags. This is the hook for
    /// announcing a real partial-download state.
    pub fn from_flags(flags: &[bool]) -> Self {
        let mut bytes = vec![0u8; (flags.len() + 7) / 8];
        for (index, &have) in flags.iter().enumerate() {
            if have {
                bytes[index / 8] |= 1 << (7 - index % 8);
            }
        }
        Self { bytes }
    }

    /// A bitfield claiming every piece, trailing pad bits included. Matches
    /// the reference client, which always announces full byte-groups rather
    /// than per-piece possession; use [`Bitfield::from_flags`] to announce a
    /// true partial state.
    pub fn all_set(npieces: usize) -> Self {
        Self {
            bytes: vec![0xff; (npieces + 7) / 8],
        }
    }

    pub fn has(&self, index: usize) -> bool {
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8);

        match self.bytes.get(byte_index) {
            Some(byte) => (byte >> bit_index) & 1 == 1,
            None => false,
        }
    }

    /// Flatten into one boolean per piece, dropping trailing pad bits
    pub fn to_flags(&self, npieces: usize) -> Vec<bool> {
        (0..npieces).map(|index| self.has(index)).collect()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first_bit_order() {
        // 0b1010_0000: pieces 0 and 2 set
        let bitfield = Bitfield::from_bytes(vec![0xa0]);
        assert!(bitfield.has(0));
        assert!(!bitfield.has(1));
        assert!(bitfield.has(2));
        assert!(!bitfield.has(3));
    }

    #[test]
    fn test_from_flags_roundtrip() {
        let flags = vec![true, false, true, true, false, false, false, true, true, false];
        let bitfield = Bitfield::from_flags(&flags);

        assert_eq!(bitfield.byte_len(), 2);
        assert_eq!(bitfield.as_bytes(), &[0b1011_0001, 0b1000_0000]);
        assert_eq!(bitfield.to_flags(flags.len()), flags);
    }

    #[test]
    fn test_all_set_sizing() {
        let bitfield = Bitfield::all_set(10);
        assert_eq!(bitfield.byte_len(), 2);
        assert!(bitfield.to_flags(10).iter().all(|&b| b));
    }

    #[test]
    fn test_out_of_range_is_unset() {
        let bitfield = Bitfield::from_bytes(vec![0xff]);
        assert!(bitfield.has(7));
        assert!(!bitfield.has(8));
    }
}
