use crate::config::MessagingConfig;
use crate::error::{AppError, AppResult};
use crate::utils::mask_phone;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// 一条待发送的验证码消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpMessage {
    pub destination: String,
    pub code: String,
    pub display_name: String,
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Single delivery attempt, no retry.
    async fn send_otp(&self, message: &OtpMessage) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignRequest<'a> {
    api_key: &'a str,
    campaign_name: &'a str,
    destination: &'a str,
    user_name: &'a str,
    template_params: [&'a str; 1],
}

#[derive(Clone)]
pub struct MessagingClient {
    client: Client,
    config: MessagingConfig,
}

impl MessagingClient {
    pub fn new(config: MessagingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent("admission-backend/messaging")
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.config.api_key.trim().is_empty() {
            return Err(AppError::ConfigError("API_KEY is not set".to_string()));
        }
        if self.config.api_url.trim().is_empty() {
            return Err(AppError::ConfigError("API_URL is not set".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSender for MessagingClient {
    async fn send_otp(&self, message: &OtpMessage) -> AppResult<()> {
        self.ensure_configured()?;

        let body = CampaignRequest {
            api_key: &self.config.api_key,
            campaign_name: &self.config.campaign_name,
            destination: &message.destination,
            user_name: &message.display_name,
            template_params: [&message.code],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::DeliveryError(format!("Messaging API timed out: {e}"))
                } else {
                    AppError::DeliveryError(format!("Messaging API request failed: {e}"))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            log::info!("OTP message accepted for delivery: {}", mask_phone(&message.destination));
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!(
                "OTP message rejected: {}, HTTP {}, Error: {}",
                mask_phone(&message.destination),
                status.as_u16(),
                error_text
            );
            Err(AppError::DeliveryError(format!(
                "Messaging API returned HTTP {}: {}",
                status.as_u16(),
                error_text
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::test_server::{never_respond, respond_once};

    fn client(api_key: &str, api_url: &str) -> MessagingClient {
        MessagingClient::new(MessagingConfig {
            api_key: api_key.to_string(),
            api_url: api_url.to_string(),
            ..MessagingConfig::default()
        })
        .unwrap()
    }

    fn message() -> OtpMessage {
        OtpMessage {
            destination: "919876543210".into(),
            code: "4821".into(),
            display_name: "Student".into(),
        }
    }

    #[tokio::test]
    async fn test_missing_credentials_is_config_error() {
        let err = client("", "https://messaging.example/send")
            .send_otp(&message())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let err = client("key", "  ").send_otp(&message()).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let body = CampaignRequest {
            api_key: "key",
            campaign_name: "OTP5",
            destination: "919876543210",
            user_name: "Asha",
            template_params: ["4821"],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "apiKey": "key",
                "campaignName": "OTP5",
                "destination": "919876543210",
                "userName": "Asha",
                "templateParams": ["4821"]
            })
        );
    }

    #[tokio::test]
    async fn test_rejected_message_is_delivery_error() {
        let url = respond_once("500 Internal Server Error", "quota exhausted").await;
        let err = client("key", &url).send_otp(&message()).await.unwrap_err();
        match err {
            AppError::DeliveryError(msg) => {
                assert!(msg.contains("500"), "{msg}");
                assert!(msg.contains("quota exhausted"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_accepted_message_is_ok() {
        let url = respond_once("200 OK", "{}").await;
        client("key", &url).send_otp(&message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_timeout_is_delivery_error() {
        let url = never_respond().await;
        let client = MessagingClient::new(MessagingConfig {
            api_key: "key".into(),
            api_url: url,
            timeout_secs: 1,
            ..MessagingConfig::default()
        })
        .unwrap();

        let err = client.send_otp(&message()).await.unwrap_err();
        match err {
            AppError::DeliveryError(msg) => assert!(msg.contains("timed out"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
