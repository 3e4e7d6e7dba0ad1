use std::fmt;
use std::time::Duration;

use super::{client::DnsApiClient, error::ApiError, models::*};
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

pub const API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct CloudflareClient {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
    timeout: Duration,
}

#[async_trait]
impl DnsApiClient for CloudflareClient {
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<ApiDnsRecord>, ApiError> {
        debug!("Listing {} records named {}", record_type, name);
        let request = self
            .client
            .get(self.records_url(zone_id))
            .query(&[("name", name), ("type", record_type.as_str())]);

        self.execute(request).await
    }

    async fn create_record(
        &self,
        zone_id: &str,
        body: &RecordBody,
    ) -> Result<ApiDnsRecord, ApiError> {
        debug!("Creating {} record {} -> {}", body.r#type, body.name, body.content);
        let request = self.client.post(self.records_url(zone_id)).json(body);

        self.execute(request).await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        body: &RecordBody,
    ) -> Result<ApiDnsRecord, ApiError> {
        debug!(
            "Updating {} record {} ({}) -> {}",
            body.r#type, body.name, record_id, body.content
        );
        let request = self
            .client
            .put(format!("{}/{}", self.records_url(zone_id), record_id))
            .json(body);

        self.execute(request).await
    }
}

impl CloudflareClient {
    pub fn new(api_token: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        Self::with_base_url(api_token, API_BASE_URL, timeout)
    }

    pub fn with_base_url(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_token: api_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }

    fn classify(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Http(err)
        }
    }

    // The envelope is checked regardless of HTTP status: 4xx responses carry their
    // reasons in `errors`.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.classify(e))?;
        debug!("Response (HTTP {}): {}", status, text);

        let parsed: ApiResponse<T> = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) => return Err(ApiError::Malformed { status, body: text }),
        };

        if !parsed.success {
            return Err(ApiError::Provider {
                status,
                errors: parsed.errors,
            });
        }

        // `success: true` without a result is still a provider failure.
        parsed.result.ok_or(ApiError::Provider {
            status,
            errors: parsed.errors,
        })
    }
}

impl fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("api_token", &"<redacted>")
            .finish()
    }
}
