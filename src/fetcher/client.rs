use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, instrument, warn};

use crate::config::FetchConfig;
use crate::fetcher::{
    ContentSource,
    backoff::retry_delay,
    errors::FetchError,
    pipeline::decode_response,
    types::{FetchOptions, PageContent},
};

const USER_AGENT: &str = "translint/0.1 (+https://github.com/translint/translint)";
const RETRY_BASE_DELAY_MS: u64 = 250;

/// Static-HTTP content source. JavaScript rendering is delegated to external
/// browser-backed sources implementing [`ContentSource`]; this one fetches
/// the server-rendered markup only.
#[derive(Debug)]
pub struct HttpSource {
    http: Client,
}

impl HttpSource {
    pub fn new(config: &FetchConfig) -> Self {
        let http = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                        .parse()
                        .expect("static accept header"),
                );
                headers
            })
            .build()
            .unwrap_or_default();
        Self { http }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<PageContent, FetchError> {
        if options.render_js {
            debug!("render_js requested but HttpSource fetches static markup only");
        }
        fetch_with_retry(&self.http, url, options).await
    }
}

#[instrument(skip_all, fields(url = %url))]
async fn fetch_with_retry(
    http: &Client,
    url: &str,
    options: &FetchOptions,
) -> Result<PageContent, FetchError> {
    let mut attempt = 0;
    loop {
        match fetch_once(http, url, options).await {
            Ok(page) => return Ok(page),
            Err(err) if err.should_retry() && attempt < options.max_retries => {
                let delay = retry_delay(attempt, RETRY_BASE_DELAY_MS);
                warn!(
                    "fetch attempt {} failed ({}), retrying in {:?}",
                    attempt + 1,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn fetch_once(
    http: &Client,
    url: &str,
    options: &FetchOptions,
) -> Result<PageContent, FetchError> {
    let parsed_url = url::Url::parse(url)?;

    let response = http
        .get(parsed_url)
        .timeout(options.timeout)
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    // Check content length before downloading
    if let Some(content_length) = response.content_length()
        && content_length > options.max_body_bytes
    {
        return Err(FetchError::BodyTooLarge(content_length));
    }

    let final_url = response.url().clone();
    let status = response.status();

    if !status.is_success() {
        return Err(FetchError::Http {
            status,
            retriable: status.is_server_error(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
        return Err(FetchError::UnsupportedContentType(content_type));
    }

    let body_bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::Io(e.to_string()))?;

    // Check body size after download (in case Content-Length was missing)
    if body_bytes.len() as u64 > options.max_body_bytes {
        return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
    }

    decode_response(final_url, status, body_bytes, &content_type)
}
