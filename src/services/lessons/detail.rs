use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LessonService, load_accessible_lesson};
use crate::models::{ApiResponse, lessons::responses::LessonResponse};

pub async fn get_lesson(
    service: &LessonService,
    request: &HttpRequest,
    id: &str,
) -> ActixResult<HttpResponse> {
    match load_accessible_lesson(service, request, id, "view").await {
        Ok((_, lesson)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            LessonResponse { lesson },
            "Lấy thông tin bài học thành công",
        ))),
        Err(response) => Ok(response),
    }
}
