use actix_web::{HttpResponse, ResponseError, Result, web};

use crate::error::AppError;
use crate::models::*;
use crate::services::OtpService;

const INVALID_OTP_MESSAGE: &str = "Invalid or expired OTP";

#[utoipa::path(
    post,
    path = "/send-otp",
    tag = "otp",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "OTP sent", body = ApiResponse),
        (status = 400, description = "Phone number missing or invalid"),
        (status = 500, description = "Messaging API not configured or delivery failed")
    )
)]
pub async fn send_otp(
    otp_service: web::Data<OtpService>,
    request: web::Json<SendOtpRequest>,
) -> Result<HttpResponse> {
    match otp_service
        .issue(request.phone_number.as_deref(), request.user_name.as_deref())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success())),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/verify-otp",
    tag = "otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "OTP verified", body = ApiResponse),
        (status = 400, description = "Phone number missing or invalid"),
        (status = 401, description = "Invalid or expired OTP")
    )
)]
pub async fn verify_otp(
    otp_service: web::Data<OtpService>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse> {
    match otp_service
        .verify(request.phone_number.as_deref(), request.otp_code.as_deref())
        .await
    {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success())),
        Ok(false) => Ok(AppError::AuthError(INVALID_OTP_MESSAGE.to_string()).error_response()),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn otp_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/send-otp", web::post().to(send_otp))
        .route("/verify-otp", web::post().to(verify_otp));
}
