//! SMS delivery collaborator.
//!
//! The gateway is an external service with a narrow send contract; the
//! trait keeps the rest of the system independent of which provider is
//! wired in.

use async_trait::async_trait;
use makaan_common::{AppError, AppResult, config::SmsConfig};

/// Outbound SMS contract.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Deliver `message` to the phone number `to`.
    async fn send(&self, to: &str, message: &str) -> AppResult<()>;
}

/// HTTP gateway implementation.
pub struct HttpSmsSender {
    client: reqwest::Client,
    gateway_url: String,
    api_key: Option<String>,
    country_prefix: String,
}

impl HttpSmsSender {
    /// Create a new HTTP sender from the gateway configuration.
    #[must_use]
    pub fn new(config: &SmsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            country_prefix: config.country_prefix.clone(),
        }
    }

    /// Normalize a phone number for the gateway: strip any `+` and ensure
    /// the country prefix is present.
    fn normalize(&self, to: &str) -> String {
        let bare = to.trim_start_matches('+');
        if bare.starts_with(&self.country_prefix) {
            bare.to_string()
        } else {
            format!("{}{}", self.country_prefix, bare)
        }
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send(&self, to: &str, message: &str) -> AppResult<()> {
        let number = self.normalize(to);
        let url = format!("{}/send/{number}", self.gateway_url);

        let mut request = self.client.get(&url).query(&[("message", message)]);
        if let Some(ref key) = self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("SMS gateway unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "SMS gateway returned {}",
                response.status()
            )));
        }

        tracing::debug!(number, "SMS dispatched");
        Ok(())
    }
}

/// No-op sender for tests and SMS-less development environments.
pub struct NoOpSms;

#[async_trait]
impl SmsSender for NoOpSms {
    async fn send(&self, to: &str, _message: &str) -> AppResult<()> {
        tracing::info!(to, "SMS delivery skipped (no gateway configured)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(prefix: &str) -> HttpSmsSender {
        HttpSmsSender::new(&SmsConfig {
            gateway_url: "https://sms.example.com/".to_string(),
            api_key: None,
            country_prefix: prefix.to_string(),
        })
    }

    #[test]
    fn test_normalize_adds_prefix() {
        assert_eq!(sender("91").normalize("9876543210"), "919876543210");
    }

    #[test]
    fn test_normalize_strips_plus_and_keeps_prefix() {
        assert_eq!(sender("91").normalize("+919876543210"), "919876543210");
    }
}
