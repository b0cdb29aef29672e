use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::playlist::PlaylistKind;

#[derive(Error, Debug)]
pub enum SeghashError {
    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    #[error("Transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("HTTP error: {status} ({url})")]
    HttpError {
        url: Url,
        status: reqwest::StatusCode,
    },

    #[error("Invalid m3u8 file: {0}")]
    ManifestParseError(String),

    #[error("Expected a {expected} playlist, got a {actual} playlist")]
    UnexpectedPlaylistType {
        expected: PlaylistKind,
        actual: PlaylistKind,
    },

    #[error("No variant streams in master playlist")]
    NoVariantsAvailable,

    #[error("Failed to read response body: {0}")]
    ReadError(#[source] std::io::Error),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cancelled")]
    Cancelled,
}

impl SeghashError {
    /// Whether the failure happened while talking to the remote end,
    /// before any response body was read.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError(_) | Self::HttpError { .. })
    }
}

pub type SeghashResult<T> = Result<T, SeghashError>;
