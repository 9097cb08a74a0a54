//! API transport configuration

use serde::{Deserialize, Serialize};
use url::Url;

use bridgecheck_core::ConfigError;

/// Settings for the bridge's REST API, read from the `[transport]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base endpoint; messages are posted to `{base_url}/message`
    pub base_url: String,

    /// Bearer token, when the API gateway is configured with one
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4242/api".to_string(),
            token: None,
        }
    }
}

impl ApiConfig {
    /// Parse and check the base endpoint
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ConfigError::Validation(format!("Invalid API base URL {}: {}", self.base_url, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Validation(format!(
                "API base URL must use http or https, got {}",
                other
            ))),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;
        if matches!(self.token.as_deref(), Some("")) {
            return Err(ConfigError::Validation(
                "API token must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint().unwrap().as_str(), "http://localhost:4242/api");
    }

    #[test]
    fn test_rejects_bad_urls() {
        let mut config = ApiConfig::default();
        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.base_url = "ftp://bridge/api".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_token() {
        let config = ApiConfig {
            token: Some(String::new()),
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
