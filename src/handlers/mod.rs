pub mod form;
pub mod health;
pub mod otp;

pub use form::form_config;
pub use health::health_config;
pub use otp::otp_config;

use actix_web::web;

use crate::error::AppError;

/// Rejects malformed JSON bodies with the same envelope as other validation errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}
