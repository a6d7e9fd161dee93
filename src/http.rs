//! HTTP client for posting cookie payloads to a collector endpoint

use reqwest::header::CONTENT_TYPE;

use crate::config::Config;
use crate::error::{JarcatError, Result};
use crate::export::CollectorPayload;

/// Media type for collector payloads
pub const JSON_MEDIA_TYPE: &str = "application/json; charset=utf-8";

const PREVIEW_LENGTH: usize = 100;

/// Result of a successful collector POST
pub struct PostOutcome {
    pub status: u16,
    pub body: String,
}

/// HTTP client wrapper for collector requests
pub struct CollectorClient {
    client: reqwest::Client,
}

impl CollectorClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout);
        if let Some(ref user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder.build()?;
        Ok(CollectorClient { client })
    }

    /// POST the payload as JSON and return the collector's response
    pub async fn post(&self, endpoint: &str, payload: &CollectorPayload) -> Result<PostOutcome> {
        let body = payload.to_json()?;
        log::debug!("POSTing {} bytes to {}", body.len(), endpoint);

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let response_body = response.text().await?;
        if !status.is_success() {
            return Err(JarcatError::Collector(format!(
                "Collector rejected the payload with HTTP {}: {}",
                status.as_u16(),
                response_preview(&response_body)
            )));
        }

        log::debug!("Collector answered with HTTP {}", status.as_u16());
        Ok(PostOutcome {
            status: status.as_u16(),
            body: response_body,
        })
    }
}

/// Truncate a response body for status lines
pub fn response_preview(body: &str) -> String {
    let preview: String = body.chars().take(PREVIEW_LENGTH).collect();
    format!("{}...", preview)
}
