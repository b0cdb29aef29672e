use futures::{StreamExt, TryStreamExt};
use reqwest::{header::HeaderMap, redirect, Client, ClientBuilder};
use url::Url;

use crate::{
    error::{SeghashError, SeghashResult},
    fetch::{ByteStream, Fetch},
};

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

#[derive(Clone, Default)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(builder: ClientBuilder) -> SeghashResult<Self> {
        let client = builder
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for HttpClient {
    async fn fetch(&self, url: &Url, headers: &HeaderMap) -> SeghashResult<ByteStream> {
        log::debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .headers(headers.clone())
            .send()
            .await?;

        if response.url() != url {
            log::warn!("{url} was redirected to {}", response.url());
        }

        if !response.status().is_success() {
            let status = response.status();
            if let Ok(body) = response.text().await {
                log::warn!("Error body: {body}");
            }
            return Err(SeghashError::HttpError {
                url: url.clone(),
                status,
            });
        }

        Ok(response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed())
    }
}
