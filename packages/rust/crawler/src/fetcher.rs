//! Network capability used by the worker pool.

use std::future::Future;

use reqwest::Client;
use tracing::debug;
use url::Url;

use wikiharvest_shared::{HarvestConfig, HarvestError, Result};

/// Fetches a page and returns its body as text.
///
/// Implementations are shared by every worker, so they must be safe for
/// concurrent use.
pub trait PageFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

/// [`PageFetcher`] over a pooled `reqwest` client.
///
/// No request timeout is set; a stalled request holds one worker only.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client with the given User-Agent and redirect limit.
    pub fn new(user_agent: &str, max_redirects: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .build()
            .map_err(|e| HarvestError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &HarvestConfig) -> Result<Self> {
        Self::new(&config.user_agent, config.max_redirects)
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// The underlying client, for callers that share its connection pool.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| HarvestError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| HarvestError::Network(format!("{url}: body read failed: {e}")))?;

        decode_body(url, &body)
    }
}

/// Decode a response body as strict UTF-8.
pub fn decode_body(url: &Url, body: &[u8]) -> Result<String> {
    std::str::from_utf8(body)
        .map(str::to_owned)
        .map_err(|e| HarvestError::Decode(format!("{url}: {e}")))
}
