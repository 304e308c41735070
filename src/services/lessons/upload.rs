use actix_multipart::{Field, Multipart};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;

use super::{LessonService, UploadedFile};
use crate::errors::UploadError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, lessons::responses::LessonResponse};

/// 文本字段的最大字节数
const MAX_TEXT_FIELD_BYTES: usize = 16 * 1024;

#[derive(Default)]
struct LessonForm {
    file: Option<UploadedFile>,
    title: String,
    description: Option<String>,
    class_group: Option<String>,
}

pub async fn upload_lesson(
    service: &LessonService,
    req: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(req) else {
        return Ok(
            HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
                ErrorCode::Unauthorized,
                "Vui lòng đăng nhập",
            )),
        );
    };

    let policy = service.get_policy(req);
    let mut form = LessonForm::default();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        match name.as_str() {
            "file" => {
                if form.file.is_some() {
                    return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                        ErrorCode::MultifileUploadNotAllowed,
                        "Chỉ được tải lên một file mỗi lần",
                    )));
                }

                let original_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                let mime_type = field
                    .content_type()
                    .map(|ct| ct.essence_str().to_string())
                    .unwrap_or_default();

                // 超过上限后不再保留内容，只继续计数，交给校验规则拒绝
                let cap = policy.max_bytes_for(&mime_type);
                let mut bytes = Vec::new();
                let mut size: u64 = 0;
                while let Some(chunk) = field.next().await {
                    let data = chunk?;
                    size += data.len() as u64;
                    if size <= cap {
                        bytes.extend_from_slice(&data);
                    } else if !bytes.is_empty() {
                        bytes = Vec::new();
                    }
                }

                form.file = Some(UploadedFile {
                    name: original_name,
                    mime_type,
                    size,
                    bytes,
                });
            }
            "title" => form.title = read_text_field(&mut field).await?,
            "description" => form.description = Some(read_text_field(&mut field).await?),
            "class_group" => form.class_group = Some(read_text_field(&mut field).await?),
            _ => {
                // 忽略未知字段
                while let Some(chunk) = field.next().await {
                    chunk?;
                }
            }
        }
    }

    let Some(file) = form.file else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "Vui lòng chọn file để tải lên",
        )));
    };

    let class_group = match form.class_group.as_deref().map(str::trim).map(str::parse::<i32>) {
        Some(Ok(group)) if group >= 0 => group,
        _ => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Lớp học không hợp lệ",
            )));
        }
    };

    let uploader = service.get_uploader(req);
    match uploader
        .submit_lesson(
            file,
            user.id,
            class_group,
            &form.title,
            form.description.as_deref(),
        )
        .await
    {
        Ok(lesson) => Ok(HttpResponse::Created().json(ApiResponse::success(
            LessonResponse { lesson },
            "Tải lên bài học thành công",
        ))),
        Err(e) => Ok(upload_error_response(&e)),
    }
}

/// 上传错误到 HTTP 响应的映射，消息原样展示给用户
pub fn upload_error_response(err: &UploadError) -> HttpResponse {
    let body = ApiResponse::error_empty(upload_error_code(err), err.user_message());
    match err {
        UploadError::RateLimited => HttpResponse::TooManyRequests().json(body),
        UploadError::ValidationFailed(_) => HttpResponse::BadRequest().json(body),
        UploadError::StorageWriteFailed(_)
        | UploadError::MetadataWriteFailed(_)
        | UploadError::CompensatingDeleteFailed(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn upload_error_code(err: &UploadError) -> ErrorCode {
    match err {
        UploadError::RateLimited => ErrorCode::RateLimitExceeded,
        UploadError::ValidationFailed(_) => ErrorCode::LessonValidationFailed,
        _ => ErrorCode::FileUploadFailed,
    }
}

async fn read_text_field(field: &mut Field) -> ActixResult<String> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk?;
        if buf.len() + data.len() > MAX_TEXT_FIELD_BYTES {
            return Err(actix_web::error::ErrorPayloadTooLarge("text field too large"));
        }
        buf.extend_from_slice(&data);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_upload_error_status_mapping() {
        let cases = [
            (UploadError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                UploadError::ValidationFailed("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                UploadError::StorageWriteFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                UploadError::MetadataWriteFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(upload_error_response(&err).status(), status, "{err}");
        }
    }
}
