//! HTTP sample source.
//!
//! Downloads the sensor's status page and scrapes the reading out of it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{scrape::extract_reading, SampleSource};
use crate::data::Reading;
use crate::error::FetchError;

/// Flat per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A sample source that polls the sensor's web page.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    /// Returns the URL being polled.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_body(&self) -> Result<String, FetchError> {
        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl SampleSource for HttpSource {
    async fn fetch(&self) -> Result<Reading, FetchError> {
        let body = self.fetch_body().await?;
        Ok(extract_reading(&body)?)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpSource`].
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSourceBuilder {
    /// Set the sensor URL (e.g., "http://192.168.1.20").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the sensor address; the URL becomes `http://<address>`.
    pub fn address(self, address: &str) -> Self {
        self.endpoint(format!("http://{}", address))
    }

    /// Set the request timeout. Defaults to 10 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpSource, FetchError> {
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://127.0.0.1".to_string());

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(HttpSource {
            client,
            description: format!("http: {}", endpoint),
            endpoint,
        })
    }
}
