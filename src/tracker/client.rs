use super::{AnnounceEvent, AnnounceRequest, TrackerResponse};
use crate::bencode;
use crate::error::{Result, TorrentError};
use tracing::{debug, info};

/// Connection events delivered by the external transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnEvent {
    /// A tracker connection is established and ready for the announce
    Connected,
    /// The announce response body has arrived
    DataIn,
    /// The announce request finished writing
    WriteFinished,
    /// The connection closed
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// No announce sent yet
    Idle,
    /// Announce handed to the transport, response pending
    AwaitingResponse,
    /// At least one response snapshot is held
    Ready,
}

/// Announce/parse state machine for one torrent session.
///
/// The client owns the latest response snapshot and the local identity but
/// no transport: `Connected` yields an [`AnnounceRequest`] for the caller to
/// send, and the response body comes back in via `DataIn`. Scheduling the
/// next announce from `interval` is the caller's job; there is no internal
/// timer.
pub struct TrackerClient {
    info_hash: [u8; 20],
    peer_id: [u8; 20],
    port: u16,
    uploaded: u64,
    downloaded: u64,
    left: u64,
    started_sent: bool,
    state: TrackerState,
    last_response: Option<TrackerResponse>,
}

impl TrackerClient {
    pub fn init(info_hash: [u8; 20], peer_id: [u8; 20], port: u16, left: u64) -> Self {
        Self {
            info_hash,
            peer_id,
            port,
            uploaded: 0,
            downloaded: 0,
            left,
            started_sent: false,
            state: TrackerState::Idle,
            last_response: None,
        }
    }

    /// Feed one connection event. `data` is the response body for `DataIn`
    /// and ignored otherwise. Returns the announce request to send when the
    /// event opens a new announce cycle.
    pub fn process(&mut self, event: ConnEvent, data: &[u8]) -> Result<Option<AnnounceRequest>> {
        match event {
            ConnEvent::Connected => {
                if self.state == TrackerState::AwaitingResponse {
                    return Err(TorrentError::Tracker(
                        "Announce already in flight".to_string(),
                    ));
                }

                let event = if self.started_sent {
                    None
                } else {
                    Some(AnnounceEvent::Started)
                };
                self.started_sent = true;
                self.state = TrackerState::AwaitingResponse;

                debug!("Announce cycle opened (event: {:?})", event);

                Ok(Some(AnnounceRequest {
                    info_hash: self.info_hash,
                    peer_id: self.peer_id,
                    port: self.port,
                    uploaded: self.uploaded,
                    downloaded: self.downloaded,
                    left: self.left,
                    event,
                }))
            }
            ConnEvent::DataIn => {
                if self.state != TrackerState::AwaitingResponse {
                    return Err(TorrentError::Tracker(
                        "Response data without a pending announce".to_string(),
                    ));
                }

                let value = bencode::decode(data)?;
                let response = TrackerResponse::from_bencode(&value)?;

                info!(
                    "Tracker response: {} peers, interval {}s",
                    response.peers.len(),
                    response.interval
                );

                self.last_response = Some(response);
                self.state = TrackerState::Ready;
                Ok(None)
            }
            ConnEvent::WriteFinished | ConnEvent::Exit => Ok(None),
        }
    }

    /// Latest response snapshot; `None` until the first successful `DataIn`
    pub fn response(&self) -> Option<&TrackerResponse> {
        self.last_response.as_ref()
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn peer_id(&self) -> &[u8; 20] {
        &self.peer_id
    }

    /// Update the transfer counters reported on the next announce
    pub fn update_progress(&mut self, uploaded: u64, downloaded: u64, left: u64) {
        self.uploaded = uploaded;
        self.downloaded = downloaded;
        self.left = left;
    }
}
