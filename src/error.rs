use thiserror::Error;

#[derive(Error, Debug)]
pub enum TorrentError {
    #[error("Invalid layout: {0}")]
    Layout(String),

    #[error("Range mapping error: {0}")]
    Mapper(String),

    #[error("Wire protocol error: {0}")]
    Wire(String),

    #[error("Tracker error: {0}")]
    Tracker(String),

    #[error("Bencode parsing error: {0}")]
    Bencode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(String),
}

impl From<url::ParseError> for TorrentError {
    fn from(err: url::ParseError) -> Self {
        TorrentError::UrlParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TorrentError>;
