use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common::string_or_number;

pub const DEFAULT_DISPLAY_NAME: &str = "Student";

/// 一个手机号当前有效的验证码记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub phone_key: String,
    pub code: String,
    pub display_name: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Challenge {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Outcome of checking a supplied code against the store.
/// Only `Accepted` is a success; callers must not reveal which failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Mismatch,
    Expired,
    Missing,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = String, example = "+91 98765-43210")]
    pub phone_number: Option<String>,
    #[schema(example = "Asha")]
    pub user_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = String, example = "9876543210")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = String, example = "4821")]
    pub otp_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_request_coerces_numeric_code() {
        let req: VerifyOtpRequest =
            serde_json::from_str(r#"{"phoneNumber": 9876543210, "otpCode": 4821}"#).unwrap();
        assert_eq!(req.phone_number.as_deref(), Some("9876543210"));
        assert_eq!(req.otp_code.as_deref(), Some("4821"));

        let req: VerifyOtpRequest =
            serde_json::from_str(r#"{"phoneNumber": "98765 43210", "otpCode": "0482"}"#).unwrap();
        assert_eq!(req.otp_code.as_deref(), Some("0482"));
    }

    #[test]
    fn test_send_request_optional_fields() {
        let req: SendOtpRequest = serde_json::from_str("{}").unwrap();
        assert!(req.phone_number.is_none());
        assert!(req.user_name.is_none());

        let req: SendOtpRequest =
            serde_json::from_str(r#"{"phoneNumber": null, "userName": "Asha"}"#).unwrap();
        assert!(req.phone_number.is_none());
        assert_eq!(req.user_name.as_deref(), Some("Asha"));
    }

    #[test]
    fn test_challenge_expiry_boundary() {
        let now = Utc::now();
        let challenge = Challenge {
            phone_key: "9876543210".into(),
            code: "1234".into(),
            display_name: DEFAULT_DISPLAY_NAME.into(),
            issued_at: now,
            expires_at: now + chrono::Duration::minutes(5),
        };
        assert!(!challenge.is_expired(now));
        assert!(challenge.is_expired(challenge.expires_at));
    }
}
