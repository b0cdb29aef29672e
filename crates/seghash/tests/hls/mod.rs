
use seghash::{FingerprintRecord, HttpClient, Ingest, RequestConfig};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

trait HlsMock {
    async fn mock<B>(&self, mock_path: &str, body: B) -> &Self
    where
        B: Into<Vec<u8>>;

    async fn mock_status(&self, mock_path: &str, status: u16) -> &Self;

    /// A route that must never be requested.
    async fn forbid(&self, mock_path: &str) -> &Self;

    async fn mock_media_playlist(&self, mock_path: &str, segments: &[&str]) -> &Self;
}

impl HlsMock for MockServer {
    async fn mock<B>(&self, mock_path: &str, body: B) -> &Self
    where
        B: Into<Vec<u8>>,
    {
        let body: Vec<u8> = body.into();
        Mock::given(method("GET"))
            .and(path(mock_path))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(self)
            .await;
        self
    }

    async fn mock_status(&self, mock_path: &str, status: u16) -> &Self {
        Mock::given(method("GET"))
            .and(path(mock_path))
            .respond_with(ResponseTemplate::new(status))
            .mount(self)
            .await;
        self
    }

    async fn forbid(&self, mock_path: &str) -> &Self {
        Mock::given(method("GET"))
            .and(path(mock_path))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(self)
            .await;
        self
    }

    async fn mock_media_playlist(&self, mock_path: &str, segments: &[&str]) -> &Self {
        let mut body = String::from(
            "#EXTM3U
#EXT-X-TARGETDURATION:10
#EXT-X-VERSION:3
",
        );
        for segment in segments {
            body.push_str("#EXTINF:9.009,\n");
            body.push_str(segment);
            body.push('\n');
        }
        body.push_str("#EXT-X-ENDLIST\n");
        self.mock(mock_path, body).await
    }
}

pub fn master_playlist(variants: &[(u64, &str)]) -> String {
    let mut body = String::from("#EXTM3U\n");
    for (bandwidth, uri) in variants {
        body.push_str(&format!("#EXT-X-STREAM-INF:BANDWIDTH={bandwidth}\n{uri}\n"));
    }
    body
}

pub async fn ingest(
    url: &str,
    config: RequestConfig,
) -> (seghash::SeghashResult<seghash::IngestOutcome>, Vec<FingerprintRecord>) {
    let ingest = Ingest::new(HttpClient::default(), config);
    let mut records = Vec::new();
    let result = ingest.run(url, &mut records).await;
    (result, records)
}
