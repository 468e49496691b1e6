use crate::error::Result;
use url::Url;

/// Lifecycle events reported to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnounceEvent {
    Started,
    Stopped,
    Completed,
}

impl AnnounceEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnounceEvent::Started => "started",
            AnnounceEvent::Stopped => "stopped",
            AnnounceEvent::Completed => "completed",
        }
    }
}

/// One announce GET request, ready to be sent by a transport
#[derive(Debug, Clone)]
pub struct AnnounceRequest {
    /// SHA1 hash of the info dictionary
    pub info_hash: [u8; 20],
    /// Our peer ID
    pub peer_id: [u8; 20],
    /// Port we listen on
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    /// Bytes left to download
    pub left: u64,
    pub event: Option<AnnounceEvent>,
}

impl AnnounceRequest {
    /// Build the query string. The two 20-byte fields are raw bytes and must
    /// be percent-encoded here rather than by a URL builder, which would
    /// escape the percent signs again.
    pub fn query_string(&self) -> String {
        let mut query = format!(
            "info_hash={}&peer_id={}&port={}&uploaded={}&downloaded={}&left={}",
            percent_encode(&self.info_hash),
            percent_encode(&self.peer_id),
            self.port,
            self.uploaded,
            self.downloaded,
            self.left,
        );

        if let Some(event) = &self.event {
            query.push_str("&event=");
            query.push_str(event.as_str());
        }

        query
    }

    /// Full announce URL for the given tracker
    pub fn announce_url(&self, tracker_url: &str) -> Result<Url> {
        let separator = if tracker_url.contains('?') { '&' } else { '?' };
        let url = Url::parse(&format!(
            "{}{}{}",
            tracker_url,
            separator,
            self.query_string()
        ))?;
        Ok(url)
    }
}

/// Percent-encode every byte, suitable for the raw 20-byte hash fields
fn percent_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("%{:02x}", b)).collect()
}
