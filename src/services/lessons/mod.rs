pub mod delete;
pub mod detail;
pub mod download;
pub mod list;
pub mod submit;
pub mod upload;

pub use submit::{LessonUploader, UploadedFile};

use actix_multipart::Multipart;
use actix_web::http::header::{
    self, Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::blob::ObjectStore;
use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    lessons::{entities::LessonRecord, requests::LessonListParams},
    users::entities::{User, UserRole},
};
use crate::services::audit::SecurityMonitor;
use crate::storage::Storage;
use crate::utils::{RateLimiter, UploadPolicy, create_safe_file_name};

pub struct LessonService {
    storage: Option<Arc<dyn Storage>>,
    objects: Option<Arc<dyn ObjectStore>>,
}

impl LessonService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            objects: None,
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_object_store(&self, request: &HttpRequest) -> Arc<dyn ObjectStore> {
        if let Some(objects) = &self.objects {
            objects.clone()
        } else {
            request
                .app_data::<web::Data<Arc<dyn ObjectStore>>>()
                .expect("ObjectStore not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_policy(&self, request: &HttpRequest) -> Arc<UploadPolicy> {
        request
            .app_data::<web::Data<Arc<UploadPolicy>>>()
            .map(|policy| policy.get_ref().clone())
            .unwrap_or_else(|| Arc::new(UploadPolicy::from(&AppConfig::get().upload)))
    }

    pub(crate) fn get_rate_limiter(&self, request: &HttpRequest) -> RateLimiter {
        request
            .app_data::<web::Data<RateLimiter>>()
            .expect("RateLimiter not found in app data")
            .get_ref()
            .clone()
    }

    pub(crate) fn get_uploader(&self, request: &HttpRequest) -> LessonUploader {
        LessonUploader::new(
            self.get_storage(request),
            self.get_object_store(request),
            self.get_rate_limiter(request),
            self.get_policy(request),
        )
        .with_user_agent(user_agent(request))
    }

    pub(crate) fn get_monitor(&self, request: &HttpRequest) -> SecurityMonitor {
        SecurityMonitor::new(self.get_storage(request))
    }

    // 上传课程成果
    pub async fn upload_lesson(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        upload::upload_lesson(self, request, payload).await
    }

    // 列出课程成果
    pub async fn list_lessons(
        &self,
        request: &HttpRequest,
        query: LessonListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_lessons(self, request, query).await
    }

    // 获取课程成果详情
    pub async fn get_lesson(&self, request: &HttpRequest, id: &str) -> ActixResult<HttpResponse> {
        detail::get_lesson(self, request, id).await
    }

    // 下载课程成果文件
    pub async fn download_lesson(
        &self,
        request: &HttpRequest,
        id: &str,
    ) -> ActixResult<HttpResponse> {
        download::download_lesson(self, request, id).await
    }

    // 删除课程成果
    pub async fn delete_lesson(
        &self,
        request: &HttpRequest,
        id: &str,
    ) -> ActixResult<HttpResponse> {
        delete::delete_lesson(self, request, id).await
    }
}

pub(crate) fn user_agent(request: &HttpRequest) -> Option<String> {
    request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

/// `filename` 为 ASCII 回退名，`filename*` 按 RFC 5987 携带 UTF-8 原始文件名
pub(crate) fn file_disposition(
    disposition: DispositionType,
    original_name: &str,
) -> ContentDisposition {
    ContentDisposition {
        disposition,
        parameters: vec![
            DispositionParam::Filename(create_safe_file_name(original_name)),
            DispositionParam::FilenameExt(ExtendedValue {
                charset: Charset::Ext("UTF-8".to_string()),
                language_tag: None,
                value: original_name.as_bytes().to_vec(),
            }),
        ],
    }
}

/// 管理员可访问全部课程成果，教师只能访问自己的
pub(crate) fn can_access(user: &User, lesson: &LessonRecord) -> bool {
    match user.role {
        UserRole::Admin => true,
        UserRole::Teacher => lesson.is_owned_by(user.id),
        UserRole::Student => false,
    }
}

/// 读取当前用户有权访问的课程成果，失败时返回对应的错误响应
pub(crate) async fn load_accessible_lesson(
    service: &LessonService,
    request: &HttpRequest,
    id: &str,
    action: &str,
) -> Result<(User, LessonRecord), HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Err(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Vui lòng đăng nhập",
        )));
    };

    let lesson = match service.get_storage(request).get_lesson_by_id(id).await {
        Ok(Some(lesson)) => lesson,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::LessonNotFound,
                "Không tìm thấy bài học",
            )));
        }
        Err(e) => {
            tracing::error!("查询课程成果失败: {e}");
            return Err(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Không thể tải thông tin bài học",
                )),
            );
        }
    };

    if !can_access(&user, &lesson) {
        service
            .get_monitor(request)
            .log_unauthorized_access(
                Some(user.id),
                &format!("lesson:{}", lesson.id),
                action,
                user_agent(request).as_deref(),
            )
            .await;
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::LessonPermissionDenied,
            "Bạn không có quyền truy cập bài học này",
        )));
    }

    Ok((user, lesson))
}
