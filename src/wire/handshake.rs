use crate::error::{Result, TorrentError};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const PROTOCOL_STRING: &[u8] = b"BitTorrent protocol";

/// Handshake length: 1 + 19 + 8 + 20 + 20
const HANDSHAKE_LEN: usize = 68;

/// The fixed initial exchange on a new peer connection
/// Format: <pstrlen=19><pstr><reserved><info_hash><peer_id>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub info_hash: [u8; 20],
    pub peer_id: [u8; 20],
}

impl Handshake {
    pub fn new(info_hash: [u8; 20], peer_id: [u8; 20]) -> Self {
        Self { info_hash, peer_id }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HANDSHAKE_LEN);

        buf.push(PROTOCOL_STRING.len() as u8);
        buf.extend_from_slice(PROTOCOL_STRING);
        buf.extend_from_slice(&[0u8; 8]);
        buf.extend_from_slice(&self.info_hash);
        buf.extend_from_slice(&self.peer_id);

        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HANDSHAKE_LEN {
            return Err(TorrentError::Wire("Handshake too short".to_string()));
        }

        let pstrlen = data[0] as usize;
        if pstrlen != PROTOCOL_STRING.len() {
            return Err(TorrentError::Wire(format!(
                "Invalid protocol string length {}",
                data[0]
            )));
        }

        if &data[1..1 + pstrlen] != PROTOCOL_STRING {
            return Err(TorrentError::Wire("Invalid protocol string".to_string()));
        }

        let mut info_hash = [0u8; 20];
        info_hash.copy_from_slice(&data[28..48]);

        let mut peer_id = [0u8; 20];
        peer_id.copy_from_slice(&data[48..68]);

        Ok(Handshake { info_hash, peer_id })
    }
}

/// Read and validate one 68-byte handshake
pub async fn read_handshake<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Handshake> {
    let mut buf = [0u8; HANDSHAKE_LEN];
    reader.read_exact(&mut buf).await?;
    Handshake::from_bytes(&buf)
}

pub async fn write_handshake<W: AsyncWrite + Unpin>(
    writer: &mut W,
    handshake: &Handshake,
) -> Result<()> {
    writer.write_all(&handshake.to_bytes()).await?;
    Ok(())
}
