use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::external::{MessageSender, OtpMessage};
use crate::models::{Challenge, DEFAULT_DISPLAY_NAME, Verdict};
use crate::services::OtpStore;
use crate::utils::*;

#[derive(Clone)]
pub struct OtpService {
    store: OtpStore,
    messenger: Arc<dyn MessageSender>,
    ttl: Duration,
}

impl OtpService {
    pub fn new(store: OtpStore, messenger: Arc<dyn MessageSender>, ttl: Duration) -> Self {
        Self {
            store,
            messenger,
            ttl,
        }
    }

    pub fn store(&self) -> &OtpStore {
        &self.store
    }

    pub async fn issue(&self, raw_phone: Option<&str>, display_name: Option<&str>) -> AppResult<()> {
        self.issue_at(raw_phone, display_name, Utc::now()).await
    }

    /// 生成并保存验证码，然后发送短信
    ///
    /// The challenge is stored before delivery is attempted and stays stored
    /// when delivery fails.
    pub async fn issue_at(
        &self,
        raw_phone: Option<&str>,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let raw_phone = raw_phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::ValidationError("Phone required".to_string()))?;

        let phone_key = normalize_phone(raw_phone)?;
        let destination = delivery_number(&phone_key);

        let display_name = display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
            .to_string();

        let code = generate_four_digit_code();

        self.store
            .put(Challenge {
                phone_key: phone_key.clone(),
                code: code.clone(),
                display_name: display_name.clone(),
                issued_at: now,
                expires_at: now + self.ttl,
            })
            .await;

        log::info!("OTP issued for {}", mask_phone(&phone_key));

        self.messenger
            .send_otp(&OtpMessage {
                destination,
                code,
                display_name,
            })
            .await
    }

    pub async fn verify(&self, raw_phone: Option<&str>, supplied_code: Option<&str>) -> AppResult<bool> {
        self.verify_at(raw_phone, supplied_code, Utc::now()).await
    }

    /// Returns `Ok(false)` for an unknown, expired or wrong code alike.
    /// The code must match exactly; surrounding whitespace is not stripped.
    pub async fn verify_at(
        &self,
        raw_phone: Option<&str>,
        supplied_code: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let raw_phone = raw_phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::ValidationError("Phone required".to_string()))?;
        let phone_key = normalize_phone(raw_phone)?;

        let Some(code) = supplied_code.filter(|c| !c.is_empty()) else {
            return Ok(false);
        };

        let verdict = self.store.check_and_consume(&phone_key, code, now).await;
        match verdict {
            Verdict::Accepted => log::info!("OTP verified for {}", mask_phone(&phone_key)),
            other => log::debug!("OTP rejected for {}: {:?}", mask_phone(&phone_key), other),
        }

        Ok(verdict.is_accepted())
    }
}
