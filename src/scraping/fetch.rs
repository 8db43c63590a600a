use crate::core::config::{FetchConfig, DEFAULT_MAX_BODY_BYTES};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("page body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Turn user input into an absolute http(s) URL.
///
/// Bare hosts such as `example.com/page` get an `https://` prefix.
pub fn normalize_target_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidUrl("empty URL".to_string()));
    }

    let lower = trimmed.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.contains("://") {
        let scheme = trimmed.split("://").next().unwrap_or_default();
        return Err(FetchError::UnsupportedScheme(scheme.to_string()));
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(FetchError::UnsupportedScheme(other.to_string())),
    }
    if !url.host_str().is_some_and(|h| !h.is_empty()) {
        return Err(FetchError::InvalidUrl(format!("{}: missing host", trimmed)));
    }
    Ok(url)
}

/// Source of page HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher used by the server.
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn from_config(cfg: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.resolve_timeout_secs()))
            .connect_timeout(Duration::from_secs(cfg.resolve_connect_timeout_secs()))
            .redirect(reqwest::redirect::Policy::limited(cfg.resolve_max_redirects()))
            .user_agent(cfg.resolve_user_agent())
            .build()?;
        Ok(Self::new(client).with_max_body_bytes(cfg.resolve_max_body_bytes()))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        info!("Fetching page: {}", url);
        let mut response = self
            .client
            .get(url.as_str())
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let limit = self.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            warn!("Refusing {}: declared length over {} bytes", url, limit);
            return Err(FetchError::TooLarge { limit });
        }

        // Content-Length may be absent or wrong; count what actually arrives.
        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if buf.len() + chunk.len() > limit {
                warn!("Aborting {}: body grew past {} bytes", url, limit);
                return Err(FetchError::TooLarge { limit });
            }
            buf.extend_from_slice(&chunk);
        }

        let body = String::from_utf8_lossy(&buf).into_owned();
        debug!("Fetched {} bytes from {}", buf.len(), url);
        Ok(body)
    }
}
