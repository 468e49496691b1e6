use std::net::{IpAddr, SocketAddr};

/// A peer as reported by the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerPeer {
    /// The peer's self-reported 20-byte id
    pub id: [u8; 20],
    pub ip: IpAddr,
    pub port: u16,
}

impl TrackerPeer {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}
