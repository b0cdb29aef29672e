use std::num::NonZeroUsize;

use url::Url;

use crate::{
    error::SeghashResult,
    fetch::{Fetch, RequestConfig},
    pipeline::{PipelineReport, SegmentPipeline},
    playlist::Variant,
    resolve::PlaylistResolver,
    select::select_variant,
    sink::RecordSink,
};

/// What a finished run looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub variant: Variant,
    pub media_playlist_url: Url,
    pub report: PipelineReport,
}

/// Master playlist in, fingerprint records out.
pub struct Ingest<F> {
    fetcher: F,
    config: RequestConfig,
    concurrency: NonZeroUsize,
}

impl<F> Ingest<F>
where
    F: Fetch + Clone + Send + Sync + 'static,
{
    pub fn new(fetcher: F, config: RequestConfig) -> Self {
        Self {
            fetcher,
            config,
            concurrency: NonZeroUsize::MIN,
        }
    }

    pub fn concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Parses `master_url` first; nothing is fetched when it is not a valid
    /// absolute URL.
    pub async fn run<S>(&self, master_url: &str, sink: &mut S) -> SeghashResult<IngestOutcome>
    where
        S: RecordSink,
    {
        let master_url = Url::parse(master_url)?;
        self.run_url(&master_url, sink).await
    }

    pub async fn run_url<S>(&self, master_url: &Url, sink: &mut S) -> SeghashResult<IngestOutcome>
    where
        S: RecordSink,
    {
        let resolver = PlaylistResolver::new(self.fetcher.clone());

        let master = resolver.resolve_master(master_url, &self.config).await?;
        let variant = select_variant(&master.variants)?.clone();
        let media_playlist_url = master_url.join(&variant.uri)?;
        log::info!(
            "Selected stream: {media_playlist_url}; Bandwidth: {bandwidth}",
            bandwidth = variant.bandwidth
        );

        let media = resolver
            .resolve_media(&media_playlist_url, &self.config)
            .await?;
        log::info!("Media playlist lists {} segments.", media.segments.len());

        let report = SegmentPipeline::new(self.fetcher.clone())
            .concurrency(self.concurrency)
            .run(&media_playlist_url, &media, &self.config, sink)
            .await?;

        Ok(IngestOutcome {
            variant,
            media_playlist_url,
            report,
        })
    }
}
