pub mod bencode;
pub mod error;
pub mod layout;
pub mod mapper;
pub mod session;
pub mod storage;
pub mod tracker;
pub mod verify;
pub mod wire;

pub use error::{Result, TorrentError};
pub use layout::{FileInfo, TorrentLayout};
pub use mapper::{FileSlice, PieceRange};
pub use session::Session;
pub use storage::SliceStore;
pub use tracker::{ConnEvent, TrackerClient, TrackerResponse};
pub use wire::{Handshake, WireMessage};
