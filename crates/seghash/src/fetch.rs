use std::{future::Future, time::Duration};

use bytes::{Bytes, BytesMut};
use futures::{stream::BoxStream, StreamExt};
use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{SeghashError, SeghashResult};

/// Response body as it arrives from the wire.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Performs a single GET request.
///
/// Implementations must not retry, and must not resolve relative addresses:
/// `url` is always absolute by construction.
pub trait Fetch {
    fn fetch(
        &self,
        url: &Url,
        headers: &HeaderMap,
    ) -> impl Future<Output = SeghashResult<ByteStream>> + Send;
}

/// Per-run request settings, passed explicitly to every stage.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Sent with every playlist and segment request.
    pub headers: HeaderMap,
    /// Deadline for one fetch, including draining its body.
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl RequestConfig {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            ..Default::default()
        }
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs one request unit under the configured deadline and cancellation.
    pub async fn guard<T, Fut>(&self, fut: Fut) -> SeghashResult<T>
    where
        Fut: Future<Output = SeghashResult<T>>,
    {
        let deadline = async {
            match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, fut)
                    .await
                    .map_err(|_| SeghashError::Timeout(timeout))?,
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SeghashError::Cancelled),
            result = deadline => result,
        }
    }
}

/// Drains a response body into memory. The stream is dropped on every path.
pub async fn read_body(mut stream: ByteStream) -> SeghashResult<Bytes> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(SeghashError::ReadError)?;
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}

/// Fetches `url` and returns its whole body.
pub async fn fetch_bytes<F>(fetcher: &F, url: &Url, config: &RequestConfig) -> SeghashResult<Bytes>
where
    F: Fetch,
{
    config
        .guard(async {
            let stream = fetcher.fetch(url, &config.headers).await?;
            read_body(stream).await
        })
        .await
}
