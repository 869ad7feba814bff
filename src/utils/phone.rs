use regex::Regex;
use std::sync::LazyLock;

use crate::error::{AppError, AppResult};

/// Country code prepended to numbers handed to the messaging API.
pub const COUNTRY_CODE: &str = "91";

static NON_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").unwrap());

/// 规范化手机号，返回只含数字的存储键
///
/// `+91 98765-43210`, `91-9876543210`, `09876543210` and `9876543210` all map
/// to `9876543210`, so issue and verify agree regardless of formatting.
pub fn normalize_phone(raw: &str) -> AppResult<String> {
    let digits = NON_DIGIT.replace_all(raw, "").into_owned();

    if digits.is_empty() {
        return Err(AppError::ValidationError("Invalid phone number".to_string()));
    }

    let key = if digits.len() == 12 && digits.starts_with(COUNTRY_CODE) {
        digits[2..].to_string()
    } else if digits.len() == 11 && digits.starts_with('0') {
        digits[1..].to_string()
    } else {
        digits
    };

    Ok(key)
}

/// Destination number for outbound delivery. Never used as a store key.
pub fn delivery_number(phone_key: &str) -> String {
    if phone_key.len() == 10 || !phone_key.starts_with(COUNTRY_CODE) {
        format!("{COUNTRY_CODE}{phone_key}")
    } else {
        phone_key.to_string()
    }
}

/// Keeps the last four digits of a number for log lines.
pub fn mask_phone(number: &str) -> String {
    let visible = number.chars().count().saturating_sub(4);
    number
        .chars()
        .enumerate()
        .map(|(i, c)| if i < visible { '*' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_formatting_variants() {
        for raw in [
            "+91 98765-43210",
            "9876543210",
            "91-9876543210",
            "(987) 654 3210",
            "098765 43210",
            " +91 (98765) 43210 ",
        ] {
            assert_eq!(normalize_phone(raw).unwrap(), "9876543210", "input {raw:?}");
        }
    }

    #[test]
    fn test_normalize_phone_keeps_ten_digits_starting_with_91() {
        assert_eq!(normalize_phone("9198765432").unwrap(), "9198765432");
    }

    #[test]
    fn test_normalize_phone_rejects_empty() {
        assert!(matches!(normalize_phone(""), Err(AppError::ValidationError(_))));
        assert!(matches!(normalize_phone("  - "), Err(AppError::ValidationError(_))));
        assert!(matches!(normalize_phone("abc"), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_delivery_number() {
        assert_eq!(delivery_number("9876543210"), "919876543210");
        assert_eq!(delivery_number("9198765432"), "919198765432");
        assert_eq!(delivery_number("919876543210123"), "919876543210123");
        assert_eq!(delivery_number("12345"), "9112345");
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("919876543210"), "********3210");
        assert_eq!(mask_phone("12"), "12");
    }
}
