use super::Bitfield;
use crate::error::{Result, TorrentError};
use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Messages exchanged between peers after the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireMessage {
    /// Zero-length frame, no message id
    KeepAlive,
    /// Pieces the peer possesses
    Bitfield(Bitfield),
    /// Request a byte range of a piece
    Request { index: u32, begin: u32, length: u32 },
    /// Deliver a byte range of a piece
    Piece {
        index: u32,
        begin: u32,
        data: Vec<u8>,
    },
}

const ID_BITFIELD: u8 = 5;
const ID_REQUEST: u8 = 6;
const ID_PIECE: u8 = 7;

/// Largest frame body we accept. A piece frame carries one 16 KiB block and
/// a bitfield byte per 8 pieces; both stay far under this. Anything larger
/// is a peer trying to make us allocate from its length prefix.
pub const MAX_MESSAGE_LEN: u32 = 1 << 20;

impl WireMessage {
    /// Serialize as a length-prefixed frame:
    /// <4 bytes BE length><1 byte id><payload>
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();

        match self {
            WireMessage::KeepAlive => {
                buf.put_u32(0);
            }
            WireMessage::Bitfield(bitfield) => {
                buf.put_u32((1 + bitfield.byte_len()) as u32);
                buf.put_u8(ID_BITFIELD);
                buf.put_slice(bitfield.as_bytes());
            }
            WireMessage::Request {
                index,
                begin,
                length,
            } => {
                buf.put_u32(13);
                buf.put_u8(ID_REQUEST);
                buf.put_u32(*index);
                buf.put_u32(*begin);
                buf.put_u32(*length);
            }
            WireMessage::Piece { index, begin, data } => {
                buf.put_u32((9 + data.len()) as u32);
                buf.put_u8(ID_PIECE);
                buf.put_u32(*index);
                buf.put_u32(*begin);
                buf.put_slice(data);
            }
        }

        buf.to_vec()
    }
}

/// Read the 4-byte big-endian frame length. Zero denotes keepalive; the
/// length does not count itself.
pub async fn read_length<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).await?;
    Ok(u32::from_be_bytes(buf))
}

/// Read one message body of `msglen` bytes (the id byte plus payload), as
/// returned by [`read_length`]. `msglen == 0` is the keepalive frame.
pub async fn read_message<R: AsyncRead + Unpin>(
    reader: &mut R,
    msglen: u32,
) -> Result<WireMessage> {
    if msglen == 0 {
        return Ok(WireMessage::KeepAlive);
    }

    if msglen > MAX_MESSAGE_LEN {
        return Err(TorrentError::Wire(format!(
            "Message length {} exceeds limit {}",
            msglen, MAX_MESSAGE_LEN
        )));
    }

    let mut id = [0u8; 1];
    reader.read_exact(&mut id).await?;

    match id[0] {
        ID_BITFIELD => {
            let mut bytes = vec![0u8; msglen as usize - 1];
            reader.read_exact(&mut bytes).await?;
            Ok(WireMessage::Bitfield(Bitfield::from_bytes(bytes)))
        }
        ID_REQUEST => {
            if msglen != 13 {
                return Err(TorrentError::Wire(format!(
                    "Request message has length {}, expected 13",
                    msglen
                )));
            }
            let mut fields = [0u8; 12];
            reader.read_exact(&mut fields).await?;
            Ok(WireMessage::Request {
                index: u32::from_be_bytes(fields[0..4].try_into().unwrap()),
                begin: u32::from_be_bytes(fields[4..8].try_into().unwrap()),
                length: u32::from_be_bytes(fields[8..12].try_into().unwrap()),
            })
        }
        ID_PIECE => {
            if msglen < 9 {
                return Err(TorrentError::Wire(format!(
                    "Piece message has length {}, expected at least 9",
                    msglen
                )));
            }
            let mut fields = [0u8; 8];
            reader.read_exact(&mut fields).await?;

            let mut data = vec![0u8; msglen as usize - 9];
            reader.read_exact(&mut data).await?;

            Ok(WireMessage::Piece {
                index: u32::from_be_bytes(fields[0..4].try_into().unwrap()),
                begin: u32::from_be_bytes(fields[4..8].try_into().unwrap()),
                data,
            })
        }
        other => Err(TorrentError::Wire(format!(
            "Unknown message ID: {}",
            other
        ))),
    }
}

/// Write one length-prefixed frame
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &WireMessage,
) -> Result<()> {
    writer.write_all(&message.encode()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn decode(frame: &[u8]) -> Result<WireMessage> {
        let mut reader = frame;
        let msglen = read_length(&mut reader).await?;
        read_message(&mut reader, msglen).await
    }

    #[test]
    fn test_keepalive_is_four_zero_bytes() {
        assert_eq!(WireMessage::KeepAlive.encode(), vec![0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_request_roundtrip() {
        let message = WireMessage::Request {
            index: 12,
            begin: 16384,
            length: 16384,
        };

        let frame = message.encode();
        assert_eq!(frame.len(), 4 + 13);
        assert_eq!(&frame[0..4], &[0, 0, 0, 13]);
        assert_eq!(frame[4], 6);

        assert_eq!(decode(&frame).await.unwrap(), message);
    }

    #[tokio::test]
    async fn test_piece_roundtrip() {
        let message = WireMessage::Piece {
            index: 2,
            begin: 0,
            data: (0..200u8).collect(),
        };

        let frame = message.encode();
        assert_eq!(&frame[0..4], &(9 + 200u32).to_be_bytes());
        assert_eq!(frame[4], 7);

        match decode(&frame).await.unwrap() {
            WireMessage::Piece { index, begin, data } => {
                assert_eq!(index, 2);
                assert_eq!(begin, 0);
                assert_eq!(data, (0..200u8).collect::<Vec<_>>());
            }
            other => panic!("Expected piece message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_piece_payload() {
        let message = WireMessage::Piece {
            index: 0,
            begin: 0,
            data: Vec::new(),
        };
        assert_eq!(decode(&message.encode()).await.unwrap(), message);
    }

    #[tokio::test]
    async fn test_bitfield_roundtrip() {
        let message = WireMessage::Bitfield(Bitfield::from_bytes(vec![0xff, 0xe0]));

        let frame = message.encode();
        assert_eq!(&frame[0..4], &[0, 0, 0, 3]);
        assert_eq!(frame[4], 5);
        assert_eq!(&frame[5..], &[0xff, 0xe0]);

        assert_eq!(decode(&frame).await.unwrap(), message);
    }

    #[tokio::test]
    async fn test_keepalive_decode() {
        assert_eq!(
            decode(&[0, 0, 0, 0]).await.unwrap(),
            WireMessage::KeepAlive
        );
    }

    #[tokio::test]
    async fn test_unknown_id_rejected() {
        // A well-framed "have" message; this codec does not speak it.
        let frame = [0, 0, 0, 5, 4, 0, 0, 0, 1];
        assert!(decode(&frame).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_length_prefix_rejected() {
        // Claims a ~4 GiB bitfield; must fail before allocating for it.
        let frame = [0xff, 0xff, 0xff, 0xff, 5];
        assert!(decode(&frame).await.is_err());
    }

    #[tokio::test]
    async fn test_bad_request_length_rejected() {
        let frame = [0, 0, 0, 5, 6, 0, 0, 0, 1];
        assert!(decode(&frame).await.is_err());
    }

    #[tokio::test]
    async fn test_truncated_piece_header_rejected() {
        let frame = [0, 0, 0, 5, 7, 0, 0, 0, 1];
        assert!(decode(&frame).await.is_err());
    }
}
