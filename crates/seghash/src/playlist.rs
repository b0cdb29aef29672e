//! Playlist data model and the decoder seam.
//!
//! Decoding yields a [`DecodedPlaylist`], which is either a master playlist
//! listing renditions or a media playlist listing segments. Callers match on
//! it and reject the shape they did not ask for.

use std::fmt;

use serde::Serialize;

use crate::error::{SeghashError, SeghashResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistKind {
    Master,
    Media,
}

impl fmt::Display for PlaylistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Media => write!(f, "media"),
        }
    }
}

/// One rendition listed in a master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Relative to the master playlist, or absolute.
    pub uri: String,
    pub bandwidth: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterPlaylist {
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Media sequence number of this segment
    pub sequence: u64,
    /// Relative to the media playlist, or absolute.
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentEntry {
    Present(Segment),
    /// A slot in the sequence that carries no addressable segment.
    Missing { sequence: u64 },
}

impl SegmentEntry {
    pub fn sequence(&self) -> u64 {
        match self {
            Self::Present(segment) => segment.sequence,
            Self::Missing { sequence } => *sequence,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaPlaylist {
    /// Entries in delivery order.
    pub segments: Vec<SegmentEntry>,
}

impl MediaPlaylist {
    pub fn present(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter_map(|entry| match entry {
            SegmentEntry::Present(segment) => Some(segment),
            SegmentEntry::Missing { .. } => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedPlaylist {
    Master(MasterPlaylist),
    Media(MediaPlaylist),
}

impl DecodedPlaylist {
    pub fn kind(&self) -> PlaylistKind {
        match self {
            Self::Master(_) => PlaylistKind::Master,
            Self::Media(_) => PlaylistKind::Media,
        }
    }
}

pub trait PlaylistDecoder {
    fn decode(&self, data: &[u8]) -> SeghashResult<DecodedPlaylist>;
}

/// Decodes M3U8 text with `m3u8-rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct M3u8Decoder;

impl PlaylistDecoder for M3u8Decoder {
    fn decode(&self, data: &[u8]) -> SeghashResult<DecodedPlaylist> {
        match m3u8_rs::parse_playlist_res(data) {
            Ok(m3u8_rs::Playlist::MasterPlaylist(pl)) => Ok(DecodedPlaylist::Master(pl.into())),
            Ok(m3u8_rs::Playlist::MediaPlaylist(pl)) => Ok(DecodedPlaylist::Media(pl.try_into()?)),
            Err(error) => Err(SeghashError::ManifestParseError(error.to_string())),
        }
    }
}

impl From<m3u8_rs::MasterPlaylist> for MasterPlaylist {
    fn from(pl: m3u8_rs::MasterPlaylist) -> Self {
        // I-frame streams are trick-play indexes, not renditions
        let variants = pl
            .variants
            .into_iter()
            .filter(|v| !v.is_i_frame)
            .map(|v| Variant {
                uri: v.uri,
                bandwidth: v.bandwidth,
            })
            .collect();
        Self { variants }
    }
}

impl TryFrom<m3u8_rs::MediaPlaylist> for MediaPlaylist {
    type Error = SeghashError;

    fn try_from(pl: m3u8_rs::MediaPlaylist) -> SeghashResult<Self> {
        let media_sequence = pl.media_sequence;
        let segments = pl
            .segments
            .into_iter()
            .enumerate()
            .map(|(i, segment)| -> SeghashResult<SegmentEntry> {
                let sequence = media_sequence.checked_add(i as u64).ok_or_else(|| {
                    SeghashError::ManifestParseError(format!(
                        "media sequence overflows at segment {i} (EXT-X-MEDIA-SEQUENCE:{media_sequence})"
                    ))
                })?;
                if segment.uri.trim().is_empty() {
                    Ok(SegmentEntry::Missing { sequence })
                } else {
                    Ok(SegmentEntry::Present(Segment {
                        sequence,
                        uri: segment.uri,
                    }))
                }
            })
            .collect::<SeghashResult<Vec<_>>>()?;
        Ok(Self { segments })
    }
}
