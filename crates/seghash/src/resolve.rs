use url::Url;

use crate::{
    error::{SeghashError, SeghashResult},
    fetch::{fetch_bytes, Fetch, RequestConfig},
    playlist::{
        DecodedPlaylist, M3u8Decoder, MasterPlaylist, MediaPlaylist, PlaylistDecoder, PlaylistKind,
    },
};

/// Fetches and decodes playlists, checking each one has the expected shape.
pub struct PlaylistResolver<F, D = M3u8Decoder> {
    fetcher: F,
    decoder: D,
}

impl<F> PlaylistResolver<F, M3u8Decoder>
where
    F: Fetch,
{
    pub fn new(fetcher: F) -> Self {
        Self::with_decoder(fetcher, M3u8Decoder)
    }
}

impl<F, D> PlaylistResolver<F, D>
where
    F: Fetch,
    D: PlaylistDecoder,
{
    pub fn with_decoder(fetcher: F, decoder: D) -> Self {
        Self { fetcher, decoder }
    }

    pub async fn resolve_master(
        &self,
        url: &Url,
        config: &RequestConfig,
    ) -> SeghashResult<MasterPlaylist> {
        match self.resolve(url, config).await? {
            DecodedPlaylist::Master(playlist) => Ok(playlist),
            DecodedPlaylist::Media(_) => Err(SeghashError::UnexpectedPlaylistType {
                expected: PlaylistKind::Master,
                actual: PlaylistKind::Media,
            }),
        }
    }

    pub async fn resolve_media(
        &self,
        url: &Url,
        config: &RequestConfig,
    ) -> SeghashResult<MediaPlaylist> {
        match self.resolve(url, config).await? {
            DecodedPlaylist::Media(playlist) => Ok(playlist),
            DecodedPlaylist::Master(_) => Err(SeghashError::UnexpectedPlaylistType {
                expected: PlaylistKind::Media,
                actual: PlaylistKind::Master,
            }),
        }
    }

    async fn resolve(&self, url: &Url, config: &RequestConfig) -> SeghashResult<DecodedPlaylist> {
        log::info!("Start fetching M3U8 file: {url}");
        let data = fetch_bytes(&self.fetcher, url, config).await?;
        let playlist = self.decoder.decode(&data)?;
        log::info!("M3U8 file fetched: {} playlist.", playlist.kind());
        Ok(playlist)
    }
}
