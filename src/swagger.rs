use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::index,
        handlers::otp::send_otp,
        handlers::otp::verify_otp,
        handlers::form::submit_form,
    ),
    components(
        schemas(
            ApiResponse,
            SendOtpRequest,
            VerifyOtpRequest,
            SubmitFormRequest,
        )
    ),
    tags(
        (name = "health", description = "Liveness API"),
        (name = "otp", description = "One-time passcode API"),
        (name = "form", description = "Admission form API"),
    ),
    info(
        title = "Admission Backend API",
        version = "1.0.0",
        description = "Admission form backend REST API documentation"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
