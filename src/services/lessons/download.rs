use actix_web::{
    HttpRequest, HttpResponse, Result as ActixResult,
    http::header::{self, DispositionType},
};

use super::{LessonService, file_disposition, load_accessible_lesson};
use crate::errors::LessonHubError;
use crate::models::{ApiResponse, ErrorCode};

pub async fn download_lesson(
    service: &LessonService,
    request: &HttpRequest,
    id: &str,
) -> ActixResult<HttpResponse> {
    let (user, lesson) = match load_accessible_lesson(service, request, id, "download").await {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };

    let bytes = match service
        .get_object_store(request)
        .get(&lesson.storage_key)
        .await
    {
        Ok(bytes) => bytes,
        Err(LessonHubError::NotFound(_)) => {
            tracing::warn!("课程成果 {} 的对象丢失: {}", lesson.id, lesson.storage_key);
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::FileNotFound,
                "File không tồn tại",
            )));
        }
        Err(e) => {
            tracing::error!("读取对象 {} 失败: {e}", lesson.storage_key);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Không thể tải file",
                )),
            );
        }
    };

    tracing::debug!("用户 {} 下载课程成果 {}", user.id, lesson.id);

    Ok(HttpResponse::Ok()
        .content_type(lesson.mime_type.as_str())
        .insert_header((
            header::CONTENT_DISPOSITION,
            file_disposition(DispositionType::Attachment, &lesson.original_file_name),
        ))
        .body(bytes))
}
