use std::{num::NonZeroUsize, str::FromStr, time::Duration};

use anyhow::Context;
use clap::Parser;
use fake_user_agent::get_chrome_rua;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT},
    ClientBuilder,
};
use seghash::{HttpClient, Ingest, OutputFormat, RequestConfig, Url, WriterSink};

#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct SeghashArgs {
    /// Debug output
    #[clap(short, long, alias = "debug")]
    verbose: bool,

    /// HTTP Header used for every request
    ///
    /// Custom header. eg. "Referer: https://example.com/". This option will override --user-agent.
    #[clap(short = 'H', long = "header")]
    headers: Vec<String>,

    /// User-Agent sent with every request. Defaults to a recent Chrome.
    #[clap(long, env = "SEGHASH_USER_AGENT")]
    user_agent: Option<String>,

    /// Deadline for each request in seconds, including its body. 0 disables it.
    #[clap(long, default_value = "60")]
    timeout: u64,

    /// Segments fetched at the same time. Output order is not affected.
    #[clap(long, default_value = "1")]
    concurrency: NonZeroUsize,

    /// Print one JSON object per segment instead of a text line
    #[clap(long)]
    json: bool,

    /// Master playlist URL
    url: String,
}

impl SeghashArgs {
    fn headers(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let user_agent = match &self.user_agent {
            Some(user_agent) => user_agent.clone(),
            None => get_chrome_rua().to_string(),
        };
        headers.insert(USER_AGENT, HeaderValue::from_str(&user_agent)?);

        for header in &self.headers {
            let (key, value) = header
                .split_once(':')
                .with_context(|| format!("Invalid header: {header}"))?;
            headers.insert(
                HeaderName::from_str(key.trim()).context("Invalid header name")?,
                HeaderValue::from_str(value.trim()).context("Invalid header value")?,
            );
        }

        Ok(headers)
    }

    fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }

    fn client(&self) -> anyhow::Result<HttpClient> {
        let mut builder = ClientBuilder::new();
        if let Some(timeout) = self.timeout() {
            builder = builder.connect_timeout(timeout);
        }
        Ok(HttpClient::new(builder)?)
    }

    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::JsonLines
        } else {
            OutputFormat::Text
        }
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| format!("seghash={level}"));
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = SeghashArgs::parse();
    init_logger(args.verbose);

    // fail before touching the network
    let master_url =
        Url::parse(&args.url).with_context(|| format!("Error parsing URL {}", args.url))?;

    let config = RequestConfig::new(args.headers()?).timeout(args.timeout());
    let cancel = config.cancel.clone();
    let ctrlc_handler = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Ctrl-C received, stopping.");
            cancel.cancel();
        }
    });

    let ingest = Ingest::new(args.client()?, config).concurrency(args.concurrency);
    let mut sink = WriterSink::new(std::io::stdout(), args.output_format());
    let result = ingest.run_url(&master_url, &mut sink).await;
    ctrlc_handler.abort();

    let outcome = result.context("Failed to fingerprint stream")?;
    log::info!(
        "Fingerprinted {} segments of {} ({} missing entries skipped).",
        outcome.report.emitted,
        outcome.media_playlist_url,
        outcome.report.skipped
    );

    Ok(())
}
