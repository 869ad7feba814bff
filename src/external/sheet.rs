use crate::config::SheetConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

#[async_trait]
pub trait SheetSink: Send + Sync {
    async fn forward(&self, payload: &Value) -> AppResult<()>;
}

/// 表格写入端点客户端
#[derive(Clone)]
pub struct SheetClient {
    client: Client,
    config: SheetConfig,
}

impl SheetClient {
    pub fn new(config: SheetConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent("admission-backend/sheet")
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl SheetSink for SheetClient {
    async fn forward(&self, payload: &Value) -> AppResult<()> {
        if self.config.ingest_url.trim().is_empty() {
            return Err(AppError::ConfigError("GOOGLE_SHEET_URL is not set".to_string()));
        }

        let response = self
            .client
            .post(&self.config.ingest_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::ForwardError(format!("Sheet endpoint timed out: {e}"))
                } else {
                    AppError::ForwardError(format!("Sheet request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!(
                "Sheet endpoint rejected submission: HTTP {}, Error: {}",
                status.as_u16(),
                error_text
            );
            return Err(AppError::ForwardError(format!(
                "Sheet endpoint returned HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        Ok(())
    }
}
