use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LessonService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    lessons::requests::{LessonListParams, LessonListQuery},
    users::entities::{User, UserRole},
};

/// 按角色收窄查询条件：教师只能看到自己的成果，学生无权查看
pub(crate) fn scope_query(user: &User, params: LessonListParams) -> Option<LessonListQuery> {
    let mut query = LessonListQuery::from(params);
    match user.role {
        UserRole::Admin => Some(query),
        UserRole::Teacher => {
            query.teacher_id = Some(user.id);
            Some(query)
        }
        UserRole::Student => None,
    }
}

pub async fn list_lessons(
    service: &LessonService,
    request: &HttpRequest,
    params: LessonListParams,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(
            HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
                ErrorCode::Unauthorized,
                "Vui lòng đăng nhập",
            )),
        );
    };

    let Some(query) = scope_query(&user, params) else {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::LessonPermissionDenied,
            "Bạn không có quyền xem danh sách bài học",
        )));
    };

    match service
        .get_storage(request)
        .list_lessons_with_pagination(query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Lấy danh sách bài học thành công",
        ))),
        Err(e) => {
            tracing::error!("查询课程成果列表失败: {e}");
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Không thể tải danh sách bài học",
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaginationQuery;
    use crate::test_utils::sample_user;

    fn params(teacher_id: Option<i64>) -> LessonListParams {
        LessonListParams {
            pagination: PaginationQuery { page: 2, size: 5 },
            class_group: Some(3),
            teacher_id,
        }
    }

    #[test]
    fn test_teacher_scope_forced_to_self() {
        let teacher = sample_user(7, "gv_007", UserRole::Teacher);
        let query = scope_query(&teacher, params(Some(99))).unwrap();
        assert_eq!(query.teacher_id, Some(7));
        assert_eq!(query.class_group, Some(3));
        assert_eq!(query.page, Some(2));
        assert_eq!(query.size, Some(5));
    }

    #[test]
    fn test_admin_keeps_filters() {
        let admin = sample_user(1, "admin", UserRole::Admin);
        assert_eq!(scope_query(&admin, params(Some(99))).unwrap().teacher_id, Some(99));
        assert_eq!(scope_query(&admin, params(None)).unwrap().teacher_id, None);
    }

    #[test]
    fn test_student_denied() {
        let student = sample_user(9, "hs_009", UserRole::Student);
        assert!(scope_query(&student, params(None)).is_none());
    }
}
