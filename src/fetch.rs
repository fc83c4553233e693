//! HTTP retrieval of terminology resources
//!
//! The [`Fetcher`] trait is the seam between the pipeline and the transport.
//! [`HttpFetcher`] is the reqwest-backed implementation; tests and embedders
//! can substitute their own.

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::types::{ByteRange, FetchResult, ResourceLocator};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};

/// Trait for issuing full or ranged GET requests
///
/// Implementations perform exactly one request per call. Retry policy belongs
/// to the caller.
///
/// # Examples
///
/// ```no_run
/// use terminology_viewer::fetch::{Fetcher, HttpFetcher};
/// use terminology_viewer::config::FetchConfig;
/// use terminology_viewer::{ByteRange, ResourceLocator};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new(&FetchConfig::default())?;
/// let locator = ResourceLocator::parse("https://example.com/gender.csv.gz")?;
///
/// let head = fetcher.fetch(&locator, Some(ByteRange::default())).await?;
/// println!("got {} bytes, range honored: {}", head.total_length, head.range_honored);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `locator`, optionally restricted to `range`
    ///
    /// Without a range any 2xx status is success. With a range, `200 OK`
    /// (range ignored, whole body returned) and `206 Partial Content` are
    /// success. Every other status is [`FetchError::Status`].
    async fn fetch(
        &self,
        locator: &ResourceLocator,
        range: Option<ByteRange>,
    ) -> Result<FetchResult, FetchError>;
}

/// reqwest-backed [`Fetcher`]
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the configured timeout and user agent
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        locator: &ResourceLocator,
        range: Option<ByteRange>,
    ) -> Result<FetchResult, FetchError> {
        let url = locator.download_url();
        let mut request = self.client.get(locator.url().clone());
        if let Some(range) = range {
            request = request.header(header::RANGE, range.header_value());
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(url, "request failed", &e))?;

        let status = response.status();
        if !accepts_status(status, range.is_some()) {
            tracing::debug!(url, status = status.as_u16(), ranged = range.is_some(), "rejected response status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, "failed to read response body", &e))?;

        let result = FetchResult::new(status.as_u16(), body.to_vec());
        tracing::debug!(
            url,
            status = result.status,
            bytes = result.total_length,
            range_honored = result.range_honored,
            "fetched resource"
        );
        Ok(result)
    }
}

fn accepts_status(status: StatusCode, ranged: bool) -> bool {
    if ranged {
        status == StatusCode::OK || status == StatusCode::PARTIAL_CONTENT
    } else {
        status.is_success()
    }
}

fn transport_error(url: &str, context: &str, e: &reqwest::Error) -> FetchError {
    let message = if e.is_timeout() {
        format!("timeout: {context}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        format!("{context}: {e}")
    };
    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}
