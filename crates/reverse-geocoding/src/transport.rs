use std::time::Duration;

use async_trait::async_trait;

use crate::error::{GeocodingError, Result};

/// Carries one outbound geocoding request and returns the raw response body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, query: &[(&'static str, String)]) -> Result<String>;
}

/// reqwest-backed transport with a per-request timeout
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, query: &[(&'static str, String)]) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::Status {
                status: format!("HTTP {}", status.as_u16()),
                message: status.canonical_reason().map(str::to_string),
            });
        }

        Ok(response.text().await?)
    }
}
