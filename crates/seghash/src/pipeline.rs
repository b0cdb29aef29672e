use std::{num::NonZeroUsize, sync::Arc};

use tokio::sync::{mpsc, Semaphore};
use url::Url;

use crate::{
    error::{SeghashError, SeghashResult},
    fetch::{Fetch, RequestConfig},
    playlist::{MediaPlaylist, Segment, SegmentEntry},
    processor::{Fingerprinter, FingerprintRecord, SegmentProcessor},
    sink::RecordSink,
    util::ordered_stream::OrderedStream,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Records handed to the sink
    pub emitted: usize,
    /// Missing entries passed over
    pub skipped: usize,
}

/// Fetches and processes every segment of a media playlist in playlist order.
///
/// The first segment that fails to resolve, fetch or process stops the run.
/// Records of earlier segments have already been emitted by then; nothing is
/// emitted for the failed segment or any segment after it. Missing entries
/// are skipped without producing a record.
///
/// With a concurrency above one, several segments are in flight at once but
/// records still reach the sink in playlist order.
pub struct SegmentPipeline<F, P = Fingerprinter> {
    fetcher: F,
    processor: P,
    concurrency: NonZeroUsize,
}

impl<F> SegmentPipeline<F, Fingerprinter> {
    pub fn new(fetcher: F) -> Self {
        Self::with_processor(fetcher, Fingerprinter)
    }
}

impl<F, P> SegmentPipeline<F, P> {
    pub fn with_processor(fetcher: F, processor: P) -> Self {
        Self {
            fetcher,
            processor,
            concurrency: NonZeroUsize::MIN,
        }
    }

    pub fn concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

impl<F, P> SegmentPipeline<F, P>
where
    F: Fetch + Clone + Send + Sync + 'static,
    P: SegmentProcessor + Clone + Send + Sync + 'static,
{
    /// `playlist_url` is where `playlist` was fetched from; relative segment
    /// URIs are resolved against it.
    pub async fn run<S>(
        &self,
        playlist_url: &Url,
        playlist: &MediaPlaylist,
        config: &RequestConfig,
        sink: &mut S,
    ) -> SeghashResult<PipelineReport>
    where
        S: RecordSink,
    {
        log::info!(
            "Start processing {} segments with {} worker(s).",
            playlist.segments.len(),
            self.concurrency
        );

        let report = if self.concurrency.get() == 1 {
            self.run_sequential(playlist_url, playlist, config, sink)
                .await?
        } else {
            self.run_parallel(playlist_url, playlist, config, sink)
                .await?
        };

        log::info!(
            "Processed {} segments, skipped {} missing.",
            report.emitted,
            report.skipped
        );
        Ok(report)
    }

    async fn run_sequential<S>(
        &self,
        playlist_url: &Url,
        playlist: &MediaPlaylist,
        config: &RequestConfig,
        sink: &mut S,
    ) -> SeghashResult<PipelineReport>
    where
        S: RecordSink,
    {
        let mut report = PipelineReport::default();
        for entry in &playlist.segments {
            let segment = match entry {
                SegmentEntry::Present(segment) => segment,
                SegmentEntry::Missing { sequence } => {
                    log::warn!("Segment {sequence} is missing from the playlist, skipped.");
                    report.skipped += 1;
                    continue;
                }
            };

            let record =
                process_segment(&self.fetcher, &self.processor, playlist_url, segment, config)
                    .await?;
            sink.emit(record)?;
            report.emitted += 1;
        }
        Ok(report)
    }

    async fn run_parallel<S>(
        &self,
        playlist_url: &Url,
        playlist: &MediaPlaylist,
        config: &RequestConfig,
        sink: &mut S,
    ) -> SeghashResult<PipelineReport>
    where
        S: RecordSink,
    {
        let mut report = PipelineReport::default();
        let mut segments = Vec::with_capacity(playlist.segments.len());
        for entry in &playlist.segments {
            match entry {
                SegmentEntry::Present(segment) => segments.push(segment.clone()),
                SegmentEntry::Missing { sequence } => {
                    log::warn!("Segment {sequence} is missing from the playlist, skipped.");
                    report.skipped += 1;
                }
            }
        }
        let total = segments.len();

        // Workers stop as soon as the run is over, whatever the outcome.
        let cancel = config.cancel.child_token();
        let task_config = config.clone().cancel_token(cancel.clone());

        let (tx, rx) = mpsc::unbounded_channel();
        let mut ordered = OrderedStream::new(rx);
        let permits = Arc::new(Semaphore::new(self.concurrency.get()));

        let fetcher = self.fetcher.clone();
        let processor = self.processor.clone();
        let base = playlist_url.clone();
        let dispatcher = tokio::spawn(async move {
            for (slot, segment) in segments.into_iter().enumerate() {
                let permit = tokio::select! {
                    biased;
                    _ = task_config.cancel.cancelled() => break,
                    permit = permits.clone().acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                };

                let fetcher = fetcher.clone();
                let processor = processor.clone();
                let base = base.clone();
                let config = task_config.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result =
                        process_segment(&fetcher, &processor, &base, &segment, &config).await;
                    // the receiver is gone once the run has stopped
                    _ = tx.send((slot as u64, result));
                    drop(permit);
                });
            }
        });

        let outcome = async {
            while let Some((_, result)) = ordered.next().await {
                sink.emit(result?)?;
                report.emitted += 1;
            }
            if report.emitted < total {
                // a slot never reported back
                return Err(SeghashError::Cancelled);
            }
            Ok::<(), SeghashError>(())
        }
        .await;

        cancel.cancel();
        dispatcher.abort();

        outcome.map(|_| report)
    }
}

async fn process_segment<F, P>(
    fetcher: &F,
    processor: &P,
    playlist_url: &Url,
    segment: &Segment,
    config: &RequestConfig,
) -> SeghashResult<FingerprintRecord>
where
    F: Fetch,
    P: SegmentProcessor,
{
    let url = playlist_url.join(&segment.uri)?;
    log::debug!("Processing segment {}: {url}", segment.sequence);

    config
        .guard(async {
            let body = fetcher.fetch(&url, &config.headers).await?;
            processor.process(segment, body).await
        })
        .await
}
