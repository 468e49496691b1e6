use crate::error::{Result, TorrentError};
use crate::layout::TorrentLayout;
use crate::tracker::{
    generate_peer_id, ConnEvent, TrackerClient, TrackerPeer, TrackerResponse,
};
use crate::wire::{
    read_handshake, read_length, read_message, write_handshake, write_message, Bitfield,
    Handshake, WireMessage,
};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// One download session: drives the tracker state machine over HTTP and
/// opens peer connections through the wire codec. Piece scheduling and
/// choke policy live above this layer.
pub struct Session {
    layout: TorrentLayout,
    info_hash: [u8; 20],
    peer_id: [u8; 20],
    tracker: TrackerClient,
    http: reqwest::Client,
}

/// An established peer connection after the initial exchange
pub struct PeerLink {
    pub stream: TcpStream,
    pub peer_id: [u8; 20],
    pub bitfield: Bitfield,
}

impl Session {
    pub fn new(layout: TorrentLayout, info_hash: [u8; 20], port: u16) -> Self {
        let peer_id = generate_peer_id();
        let left = layout.total_length();

        info!("Session initialized with peer_id: {}", hex::encode(peer_id));

        Self {
            layout,
            info_hash,
            peer_id,
            tracker: TrackerClient::init(info_hash, peer_id, port, left),
            http: reqwest::Client::new(),
        }
    }

    pub fn layout(&self) -> &TorrentLayout {
        &self.layout
    }

    pub fn tracker(&mut self) -> &mut TrackerClient {
        &mut self.tracker
    }

    /// Run one announce cycle against the tracker and return the fresh
    /// snapshot.
    pub async fn announce(&mut self, tracker_url: &str) -> Result<&TrackerResponse> {
        let request = self
            .tracker
            .process(ConnEvent::Connected, &[])?
            .ok_or_else(|| TorrentError::Tracker("No announce request produced".to_string()))?;

        let url = request.announce_url(tracker_url)?;
        debug!("Announcing to {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TorrentError::Tracker(format!("HTTP error: {}", status)));
        }

        let body = response.bytes().await?;
        self.tracker.process(ConnEvent::DataIn, &body)?;

        self.tracker
            .response()
            .ok_or_else(|| TorrentError::Tracker("No response snapshot".to_string()))
    }

    /// First peer in the snapshot that is not ourselves
    pub fn pick_peer<'a>(&self, response: &'a TrackerResponse) -> Option<&'a TrackerPeer> {
        response.peers.iter().find(|peer| peer.id != self.peer_id)
    }

    /// Connect to a peer: exchange handshakes, send our bitfield and read
    /// the peer's. Keepalives before the bitfield are skipped.
    pub async fn connect(&self, peer: &TrackerPeer) -> Result<PeerLink> {
        let addr = peer.addr();
        info!("Connecting to peer: {}", addr);

        let mut stream = TcpStream::connect(addr).await.map_err(|e| {
            TorrentError::Wire(format!("Failed to connect to {}: {}", addr, e))
        })?;

        write_handshake(&mut stream, &Handshake::new(self.info_hash, self.peer_id)).await?;
        let theirs = read_handshake(&mut stream).await?;

        if theirs.info_hash != self.info_hash {
            return Err(TorrentError::Wire("Info hash mismatch".to_string()));
        }

        // The reference writer always claims every piece; from_flags is the
        // hook once real possession state is tracked.
        let ours = Bitfield::all_set(self.layout.num_pieces());
        write_message(&mut stream, &WireMessage::Bitfield(ours)).await?;

        let bitfield = loop {
            let msglen = read_length(&mut stream).await?;
            match read_message(&mut stream, msglen).await? {
                WireMessage::KeepAlive => continue,
                WireMessage::Bitfield(bitfield) => break bitfield,
                other => {
                    warn!("Expected bitfield from {}, got {:?}", addr, other);
                    return Err(TorrentError::Wire(
                        "Peer did not open with a bitfield".to_string(),
                    ));
                }
            }
        };

        info!("Peer {} connected, {} bitfield bytes", addr, bitfield.byte_len());

        Ok(PeerLink {
            stream,
            peer_id: theirs.peer_id,
            bitfield,
        })
    }
}
