use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{VideoService, authorize_class};
use crate::models::{
    ApiResponse, ErrorCode, PaginatedResponse, PaginationQuery,
    lessons::{requests::LessonListQuery, responses::ClassVideo},
};

pub async fn list_class_videos(
    service: &VideoService,
    request: &HttpRequest,
    class_group: i32,
    pagination: PaginationQuery,
) -> ActixResult<HttpResponse> {
    if let Err(response) = authorize_class(service, request, class_group, "list_videos").await {
        return Ok(response);
    }

    match service
        .get_storage(request)
        .list_lessons_with_pagination(LessonListQuery::class_videos(class_group, pagination))
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            PaginatedResponse {
                items: page.items.into_iter().map(ClassVideo::from).collect(),
                pagination: page.pagination,
            },
            "Lấy danh sách video thành công",
        ))),
        Err(e) => {
            tracing::error!("查询班级 {class_group} 视频失败: {e}");
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Không thể tải danh sách video",
                )),
            )
        }
    }
}
