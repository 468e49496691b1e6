use super::TrackerPeer;
use crate::bencode::Value;
use crate::error::{Result, TorrentError};
use std::net::IpAddr;

/// One announce response snapshot. Each successful parse replaces the
/// previous snapshot wholesale; no history is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerResponse {
    /// Seeders in the swarm
    pub complete: u64,
    /// Leechers in the swarm
    pub incomplete: u64,
    /// Seconds to wait before the next announce
    pub interval: u64,
    pub peers: Vec<TrackerPeer>,
}

impl TrackerResponse {
    /// Parse a bencoded announce response.
    ///
    /// The schema is strict: exactly the keys `complete`, `incomplete`,
    /// `interval` and `peers` at top level, and exactly `ip`, `peer id`,
    /// `port` per peer entry. Unknown keys are an error.
    pub fn from_bencode(value: &Value) -> Result<Self> {
        let dict = value
            .as_dict()
            .ok_or_else(|| TorrentError::Tracker("Response must be a dict".to_string()))?;

        for key in dict.keys() {
            match key.as_slice() {
                b"complete" | b"incomplete" | b"interval" | b"peers" => {}
                other => {
                    return Err(TorrentError::Tracker(format!(
                        "Unknown response key: {:?}",
                        String::from_utf8_lossy(other)
                    )))
                }
            }
        }

        let complete = required_integer(dict, b"complete")?;
        let incomplete = required_integer(dict, b"incomplete")?;
        let interval = required_integer(dict, b"interval")?;

        let peer_list = dict
            .get(b"peers".as_ref())
            .and_then(|v| v.as_list())
            .ok_or_else(|| TorrentError::Tracker("Missing 'peers' list".to_string()))?;

        let peers = peer_list
            .iter()
            .map(parse_peer)
            .collect::<Result<Vec<_>>>()?;

        Ok(TrackerResponse {
            complete,
            incomplete,
            interval,
            peers,
        })
    }
}

fn required_integer(
    dict: &std::collections::BTreeMap<Vec<u8>, Value>,
    key: &[u8],
) -> Result<u64> {
    dict.get(key)
        .and_then(|v| v.as_integer())
        .filter(|i| *i >= 0)
        .map(|i| i as u64)
        .ok_or_else(|| {
            TorrentError::Tracker(format!(
                "Missing or invalid '{}' field",
                String::from_utf8_lossy(key)
            ))
        })
}

fn parse_peer(value: &Value) -> Result<TrackerPeer> {
    let dict = value
        .as_dict()
        .ok_or_else(|| TorrentError::Tracker("Peer entry must be a dict".to_string()))?;

    for key in dict.keys() {
        match key.as_slice() {
            b"ip" | b"peer id" | b"port" => {}
            other => {
                return Err(TorrentError::Tracker(format!(
                    "Unknown peer key: {:?}",
                    String::from_utf8_lossy(other)
                )))
            }
        }
    }

    let ip: IpAddr = dict
        .get(b"ip".as_ref())
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| TorrentError::Tracker("Missing or invalid peer 'ip'".to_string()))?;

    let id_bytes = dict
        .get(b"peer id".as_ref())
        .and_then(|v| v.as_bytes())
        .ok_or_else(|| TorrentError::Tracker("Missing peer 'peer id'".to_string()))?;

    if id_bytes.len() != 20 {
        return Err(TorrentError::Tracker(format!(
            "Peer id must be 20 bytes, got {}",
            id_bytes.len()
        )));
    }
    let mut id = [0u8; 20];
    id.copy_from_slice(id_bytes);

    let port = dict
        .get(b"port".as_ref())
        .and_then(|v| v.as_integer())
        .filter(|p| (0..=u16::MAX as i64).contains(p))
        .ok_or_else(|| TorrentError::Tracker("Missing or invalid peer 'port'".to_string()))?
        as u16;

    Ok(TrackerPeer { id, ip, port })
}
