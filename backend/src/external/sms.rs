//! SMS gateway channel
//!
//! Delivers alert messages to a farmer's phone. The real client posts to an
//! HTTP SMS gateway; the console channel logs the message and fabricates a
//! message id so unconfigured deployments behave end to end.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::types::Urgency;

use crate::error::{AppError, AppResult};

/// Result of a dispatch attempt
#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    pub success: bool,
    pub message_id: Option<String>,
    /// Gateway-reported reason when `success` is false
    pub error: Option<String>,
}

/// Sends a message through an external channel
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(
        &self,
        to_phone: &str,
        message: &str,
        urgency: Urgency,
    ) -> AppResult<DispatchReceipt>;
}

/// Client for the SMS gateway API
#[derive(Clone)]
pub struct SmsGatewayClient {
    api_endpoint: String,
    api_key: String,
    http_client: Client,
}

#[derive(Serialize)]
struct SmsRequest<'a> {
    phone: &'a str,
    message: &'a str,
    key: &'a str,
}

/// Gateway response
#[derive(Debug, Deserialize)]
pub struct SmsGatewayResponse {
    pub success: bool,
    #[serde(rename = "textId")]
    pub text_id: Option<i64>,
    pub error: Option<String>,
}

impl From<SmsGatewayResponse> for DispatchReceipt {
    fn from(r: SmsGatewayResponse) -> Self {
        DispatchReceipt {
            success: r.success,
            message_id: r.text_id.map(|id| id.to_string()),
            error: r.error,
        }
    }
}

impl SmsGatewayClient {
    /// Create a new SMS gateway client
    pub fn new(api_endpoint: String, api_key: String) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_endpoint,
            api_key,
            http_client,
        }
    }
}

#[async_trait]
impl NotificationChannel for SmsGatewayClient {
    async fn send(
        &self,
        to_phone: &str,
        message: &str,
        _urgency: Urgency,
    ) -> AppResult<DispatchReceipt> {
        let request = SmsRequest {
            phone: to_phone,
            message,
            key: &self.api_key,
        };

        let response = self
            .http_client
            .post(&self.api_endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("SMS request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "SMS gateway returned {}: {}",
                status, body
            )));
        }

        let data: SmsGatewayResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse SMS response: {}", e))
        })?;

        Ok(data.into())
    }
}

/// Logging channel for deployments without an SMS gateway key
pub struct ConsoleSmsChannel;

#[async_trait]
impl NotificationChannel for ConsoleSmsChannel {
    async fn send(
        &self,
        to_phone: &str,
        message: &str,
        urgency: Urgency,
    ) -> AppResult<DispatchReceipt> {
        tracing::info!("SMS [{}] to {}: {}", urgency.as_str(), to_phone, message);

        Ok(DispatchReceipt {
            success: true,
            message_id: Some(format!("console-{}", uuid::Uuid::new_v4())),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_response_conversion() {
        let accepted = SmsGatewayResponse {
            success: true,
            text_id: Some(987654),
            error: None,
        };
        let receipt: DispatchReceipt = accepted.into();
        assert!(receipt.success);
        assert_eq!(receipt.message_id.as_deref(), Some("987654"));

        let rejected = SmsGatewayResponse {
            success: false,
            text_id: None,
            error: Some("Out of quota".to_string()),
        };
        let receipt: DispatchReceipt = rejected.into();
        assert!(!receipt.success);
        assert_eq!(receipt.error.as_deref(), Some("Out of quota"));
    }

    #[tokio::test]
    async fn test_console_channel_fabricates_message_id() {
        let receipt = ConsoleSmsChannel
            .send("0812345678", "NDVI dropping fast", Urgency::Urgent)
            .await
            .unwrap();

        assert!(receipt.success);
        assert!(receipt.message_id.unwrap().starts_with("console-"));
    }
}
