//! Request/response exchange with the device.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::error::TransportError;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one GET to `<base><path>` and returns the body text.
    async fn request(&self, path: &str) -> Result<String, TransportError>;
}

#[derive(Debug, Error)]
pub enum TransportSetupError {
    #[error("invalid device url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("device url must use http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("device url must not carry a query or fragment: '{0}'")]
    UnexpectedSuffix(String),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

pub struct HttpTransport {
    http: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransportSetupError> {
        let parsed = Url::parse(base_url).map_err(|source| TransportSetupError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportSetupError::UnsupportedScheme(
                parsed.scheme().to_string(),
            ));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(TransportSetupError::UnexpectedSuffix(base_url.to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn validate_path(path: &str) -> Result<(), TransportError> {
    if !path.starts_with('/') || path.starts_with("//") {
        return Err(TransportError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, path: &str) -> Result<String, TransportError> {
        validate_path(path)?;
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "device request");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| TransportError::Unreachable(err.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        res.text().await.map_err(|err| TransportError::Malformed {
            path: path.to_string(),
            detail: err.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
