mod client;
mod peer;
mod request;
mod response;

pub use client::{ConnEvent, TrackerClient, TrackerState};
pub use peer::TrackerPeer;
pub use request::{AnnounceEvent, AnnounceRequest};
pub use response::TrackerResponse;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Azureus-style client prefix reported to trackers and peers
const PEER_ID_PREFIX: &[u8; 8] = b"-TC0001-";

/// Fresh 20-byte identity: the client prefix followed by 12 random
/// alphanumeric bytes
pub fn generate_peer_id() -> [u8; 20] {
    let mut id = [0u8; 20];
    id[..8].copy_from_slice(PEER_ID_PREFIX);

    let rng = rand::thread_rng();
    for (slot, byte) in id[8..].iter_mut().zip(rng.sample_iter(Alphanumeric)) {
        *slot = byte;
    }

    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_id_shape() {
        let id = generate_peer_id();
        assert_eq!(&id[..8], PEER_ID_PREFIX);
        assert!(id[8..].iter().all(|b| b.is_ascii_alphanumeric()));
    }
}
