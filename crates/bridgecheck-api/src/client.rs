//! HTTP transport for the bridge's REST API

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, info};
use url::Url;

use bridgecheck_core::{ConfigError, Transport};

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::message::ApiMessage;

/// Session against the bridge API: a configured HTTP client and base endpoint
#[derive(Debug, Clone)]
pub struct ApiTransport {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: config.endpoint()?,
            token: config.token.clone(),
        })
    }

    /// Where messages are posted
    pub fn message_endpoint(&self) -> String {
        format!("{}/message", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Submit one message. Anything but HTTP 200 is a rejection carrying the response body.
    pub async fn send_message(&self, message: &ApiMessage) -> Result<()> {
        let endpoint = self.message_endpoint();
        let payload = serde_json::to_vec(message)?;

        let mut request = self
            .http
            .post(&endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        debug!("POST {}", endpoint);
        let response = request.send().await?;
        let status = response.status();
        info!("response Status: {}", status);
        debug!("response Headers: {:?}", response.headers());

        let body = response.text().await.unwrap_or_default();
        info!("response Body: {}", body);

        if status != StatusCode::OK {
            return Err(ApiError::Rejected { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for ApiTransport {
    type Config = ApiConfig;
    type Error = ApiError;

    const INIT_NOTICE: &'static str = "Initializing API";

    fn validate_config(config: &Self::Config) -> std::result::Result<(), ConfigError> {
        config.validate()
    }

    async fn connect(config: &Self::Config) -> Result<Self> {
        ApiTransport::new(config)
    }

    async fn shutdown(&self) -> Result<()> {
        // Connections are pooled by reqwest and dropped with the client.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_endpoint() {
        let api = ApiTransport::new(&ApiConfig::default()).unwrap();
        assert_eq!(api.message_endpoint(), "http://localhost:4242/api/message");

        let api = ApiTransport::new(&ApiConfig {
            base_url: "http://bridge:4242/api/".to_string(),
            token: None,
        })
        .unwrap();
        assert_eq!(api.message_endpoint(), "http://bridge:4242/api/message");
    }

    #[test]
    fn test_invalid_config_fails_setup() {
        let err = ApiTransport::new(&ApiConfig {
            base_url: "bridge".to_string(),
            token: None,
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_rejection_message() {
        let err = ApiError::Rejected {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "gateway not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to POST message to the API: 500 Internal Server Error\ngateway not found"
        );
    }
}
