use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde_json::json;

use super::{LessonService, load_accessible_lesson, user_agent};
use crate::models::{ApiResponse, ErrorCode, audit::Severity};
use crate::services::audit::EVENT_LESSON_DELETED;

pub async fn delete_lesson(
    service: &LessonService,
    request: &HttpRequest,
    id: &str,
) -> ActixResult<HttpResponse> {
    let (user, lesson) = match load_accessible_lesson(service, request, id, "delete").await {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };

    // 对象删除失败不阻断记录删除
    if let Err(e) = service
        .get_object_store(request)
        .delete(std::slice::from_ref(&lesson.storage_key))
        .await
    {
        tracing::warn!("删除对象 {} 失败: {e}", lesson.storage_key);
    }

    match service.get_storage(request).delete_lesson(&lesson.id).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::LessonNotFound,
                "Không tìm thấy bài học",
            )));
        }
        Err(e) => {
            tracing::error!("删除课程成果 {} 失败: {e}", lesson.id);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::LessonDeleteFailed,
                    "Xóa bài học thất bại",
                )),
            );
        }
    }

    service
        .get_monitor(request)
        .log_security_event(
            Some(user.id),
            EVENT_LESSON_DELETED,
            json!({
                "lesson_id": lesson.id,
                "teacher_id": lesson.teacher_id,
                "storage_key": lesson.storage_key,
            }),
            Severity::Low,
            user_agent(request).as_deref(),
        )
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Xóa bài học thành công")))
}
