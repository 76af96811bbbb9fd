//! Low-level HTTP client for fetching mapping documents.

use reqwest::Client;
use std::time::Duration;

use crate::error::HttpError;
use crate::http::retry::RetryPolicy;

/// Fetches raw config documents over HTTP.
#[derive(Debug, Clone)]
pub struct ConfigHttp {
    client: Client,
}

impl ConfigHttp {
    pub fn new() -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one shared with the rest of the application.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GET `url` and return the body bytes.
    pub async fn get_bytes(&self, url: &str, retry: &RetryPolicy) -> Result<Vec<u8>, HttpError> {
        let Some(config) = retry.config() else {
            return self.do_get(url).await;
        };

        config.run(url, || self.do_get(url)).await
    }

    async fn do_get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.bytes().await?.to_vec());
        }

        let status_code = status.as_u16();
        let body_text = resp.text().await.unwrap_or_default();

        match status_code {
            404 => Err(HttpError::NotFound(body_text)),
            429 => Err(HttpError::RateLimited),
            400..=499 => Err(HttpError::BadRequest(body_text)),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}
