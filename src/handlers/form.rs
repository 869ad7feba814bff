use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpResponse, ResponseError, Result, web};
use futures_util::TryStreamExt;

use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::SubmissionService;

const MAX_TEXT_FIELD_BYTES: usize = 8 * 1024;

#[utoipa::path(
    post,
    path = "/submit-form",
    tag = "form",
    request_body(content = SubmitFormRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Form forwarded", body = ApiResponse),
        (status = 400, description = "Required files missing or malformed body"),
        (status = 413, description = "Uploaded file too large"),
        (status = 500, description = "Forwarding failed")
    )
)]
pub async fn submit_form(
    submission_service: web::Data<SubmissionService>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = match read_form(payload, submission_service.max_file_bytes()).await {
        Ok(form) => form,
        Err(e) => return Ok(e.error_response()),
    };

    match submission_service.submit(form).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success())),
        Err(e) => Ok(e.error_response()),
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::ValidationError(format!("Invalid multipart body: {e}"))
}

/// 读取表单，文件全部缓存在内存中
async fn read_form(mut payload: Multipart, max_file_bytes: usize) -> AppResult<SubmissionForm> {
    let mut form = SubmissionForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            drain(&mut field).await?;
            continue;
        };

        if let Some(file_field) = FileField::from_name(&name) {
            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .filter(|n| !n.is_empty())
                .map(str::to_string);
            let content_type = field
                .content_type()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let data = read_limited(&mut field, max_file_bytes)
                .await?
                .ok_or_else(|| {
                    AppError::PayloadTooLarge(format!(
                        "File {name} exceeds {max_file_bytes} bytes"
                    ))
                })?;

            // Browsers send an empty part when no file was chosen.
            if data.is_empty() {
                continue;
            }

            form.files.insert(
                file_field,
                Attachment {
                    file_name,
                    content_type,
                    data,
                },
            );
            continue;
        }

        let slot = match name.as_str() {
            "name" => &mut form.name,
            "phone" => &mut form.phone,
            "parentProfession" => &mut form.parent_profession,
            _ => {
                drain(&mut field).await?;
                continue;
            }
        };

        let bytes = read_limited(&mut field, MAX_TEXT_FIELD_BYTES)
            .await?
            .ok_or_else(|| AppError::ValidationError(format!("Field {name} is too long")))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| AppError::ValidationError(format!("Field {name} is not valid UTF-8")))?;
        *slot = Some(text.trim().to_string());
    }

    Ok(form)
}

/// Reads the whole field, or `None` once it grows past `limit` bytes.
async fn read_limited(field: &mut Field, limit: usize) -> AppResult<Option<Vec<u8>>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > limit {
            return Ok(None);
        }
        data.extend_from_slice(&chunk);
    }
    Ok(Some(data))
}

async fn drain(field: &mut Field) -> AppResult<()> {
    while field.try_next().await.map_err(multipart_error)?.is_some() {}
    Ok(())
}

pub fn form_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/submit-form", web::post().to(submit_form));
}
