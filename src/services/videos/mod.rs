//! 班级视频目录
//!
//! 按班级列出视频类型的课程成果，并支持 `Range` 请求的流式读取。
//! 管理员和 `user_group = 0` 的用户可以查看全部班级，其他用户只能查看自己所在的班级。

pub mod list;
pub mod stream;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::blob::ObjectStore;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, PaginationQuery, users::entities::User};
use crate::services::audit::SecurityMonitor;
use crate::services::lessons::user_agent;
use crate::storage::Storage;

pub struct VideoService {
    storage: Option<Arc<dyn Storage>>,
    objects: Option<Arc<dyn ObjectStore>>,
}

impl VideoService {
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

    // 列出班级视频
    pub async fn list_class_videos(
        &self,
        request: &HttpRequest,
        class_group: i32,
        pagination: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_class_videos(self, request, class_group, pagination).await
    }

    // 播放班级视频
    pub async fn stream_video(
        &self,
        request: &HttpRequest,
        class_group: i32,
        id: &str,
    ) -> ActixResult<HttpResponse> {
        stream::stream_video(self, request, class_group, id).await
    }
}

/// 校验当前用户能否查看该班级，失败时返回对应的错误响应
pub(crate) async fn authorize_class(
    service: &VideoService,
    request: &HttpRequest,
    class_group: i32,
    action: &str,
) -> Result<User, HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Err(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Vui lòng đăng nhập",
        )));
    };

    if class_group < 0 {
        return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Lớp học không hợp lệ",
        )));
    }

    if !user.can_view_class(class_group) {
        SecurityMonitor::new(service.get_storage(request))
            .log_unauthorized_access(
                Some(user.id),
                &format!("class:{class_group}:videos"),
                action,
                user_agent(request).as_deref(),
            )
            .await;
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::LessonPermissionDenied,
            "Bạn không có quyền xem video của lớp này",
        )));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use crate::models::users::entities::UserRole;
    use crate::test_utils::sample_user;

    #[test]
    fn test_class_visibility() {
        let admin = sample_user(1, "admin", UserRole::Admin);
        assert!(admin.can_view_class(3));

        let mut all_classes = sample_user(5, "gv_005", UserRole::Teacher);
        all_classes.user_group = Some(0);
        assert!(all_classes.can_view_class(3));

        let mut student = sample_user(9, "hs_009", UserRole::Student);
        student.user_group = Some(2);
        assert!(student.can_view_class(2));
        assert!(!student.can_view_class(3));

        let unassigned = sample_user(10, "hs_010", UserRole::Student);
        assert!(!unassigned.can_view_class(2));
    }
}
