use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::lessons::requests::LessonListParams;
use crate::models::users::entities::UserRole;
use crate::services::LessonService;

// 懒加载的全局 LessonService 实例
static LESSON_SERVICE: Lazy<LessonService> = Lazy::new(LessonService::new_lazy);

pub async fn upload_lesson(
    request: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.upload_lesson(&request, payload).await
}

pub async fn list_lessons(
    request: HttpRequest,
    query: web::Query<LessonListParams>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .list_lessons(&request, query.into_inner())
        .await
}

pub async fn get_lesson(
    request: HttpRequest,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.get_lesson(&request, &path.into_inner()).await
}

pub async fn download_lesson(
    request: HttpRequest,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .download_lesson(&request, &path.into_inner())
        .await
}

pub async fn delete_lesson(
    request: HttpRequest,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .delete_lesson(&request, &path.into_inner())
        .await
}

// 配置路由
pub fn configure_lesson_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/lessons")
            .wrap(middlewares::RequireRole::new_any(UserRole::lesson_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::post().to(upload_lesson))
            .route("", web::get().to(list_lessons))
            .route("/{id}/download", web::get().to(download_lesson))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_lesson))
                    .route(web::delete().to(delete_lesson)),
            ),
    );
}
