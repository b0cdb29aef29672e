//! In-memory fetcher for unit tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use bytes::Bytes;
use futures::{stream, StreamExt};
use reqwest::{header::HeaderMap, StatusCode};
use url::Url;

use crate::{
    error::{SeghashError, SeghashResult},
    fetch::{ByteStream, Fetch},
};

pub const MASTER: &str = "#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=500000
low.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=2000000
high.m3u8
";

pub const MEDIA: &str = "#EXTM3U
#EXT-X-TARGETDURATION:10
#EXT-X-VERSION:3
#EXTINF:9.009,
seg0.ts
#EXTINF:9.009,
seg1.ts
#EXT-X-ENDLIST
";

#[derive(Clone)]
enum Response {
    Body(Bytes),
    Status(u16),
    Truncated(Bytes),
    Delayed(Duration, Bytes),
}

#[derive(Clone, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Response>,
    requests: Arc<Mutex<Vec<(Url, HeaderMap)>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn respond(mut self, url: &str, response: Response) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn body(self, url: &str, body: impl AsRef<[u8]>) -> Self {
        let body = Bytes::copy_from_slice(body.as_ref());
        self.respond(url, Response::Body(body))
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.respond(url, Response::Status(status))
    }

    /// Sends `body`, then resets the connection.
    pub fn truncated(self, url: &str, body: impl AsRef<[u8]>) -> Self {
        let body = Bytes::copy_from_slice(body.as_ref());
        self.respond(url, Response::Truncated(body))
    }

    pub fn delayed(self, url: &str, delay: Duration, body: impl AsRef<[u8]>) -> Self {
        let body = Bytes::copy_from_slice(body.as_ref());
        self.respond(url, Response::Delayed(delay, body))
    }

    /// Requests seen so far, in the order they were made.
    pub fn requests(&self) -> Vec<(Url, HeaderMap)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|(url, _)| url.to_string())
            .collect()
    }
}

impl Fetch for MemoryFetcher {
    async fn fetch(&self, url: &Url, headers: &HeaderMap) -> SeghashResult<ByteStream> {
        self.requests
            .lock()
            .unwrap()
            .push((url.clone(), headers.clone()));

        let status = |code: u16| SeghashError::HttpError {
            url: url.clone(),
            status: StatusCode::from_u16(code).unwrap(),
        };

        match self.responses.get(url.as_str()).cloned() {
            None => Err(status(404)),
            Some(Response::Status(code)) => Err(status(code)),
            Some(Response::Body(body)) => Ok(stream::once(async move { Ok(body) }).boxed()),
            Some(Response::Truncated(body)) => Ok(stream::iter(vec![
                Ok(body),
                Err(std::io::Error::from(std::io::ErrorKind::ConnectionReset)),
            ])
            .boxed()),
            Some(Response::Delayed(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(stream::once(async move { Ok(body) }).boxed())
            }
        }
    }
}
