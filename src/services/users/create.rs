use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        requests::{CreateUserRequest, NewUser},
        responses::UserResponse,
    },
};
use crate::utils::password::hash_password;
use crate::utils::sanitize::sanitize_text;
use crate::utils::validate::{validate_password, validate_username};

/// 校验并整理创建请求，失败时返回错误码与提示
pub(crate) fn prepare_new_user(
    user_data: CreateUserRequest,
) -> Result<(NewUser, String), (ErrorCode, String)> {
    let user_no = user_data.user_no.trim().to_string();
    validate_username(&user_no).map_err(|msg| (ErrorCode::UserNameInvalid, msg.to_string()))?;

    validate_password(&user_data.password)
        .into_result()
        .map_err(|msg| (ErrorCode::UserPasswordInvalid, msg))?;

    if user_data.user_group.is_some_and(|group| group < 0) {
        return Err((ErrorCode::BadRequest, "Lớp học không hợp lệ".to_string()));
    }

    let user_name = user_data
        .user_name
        .as_deref()
        .map(sanitize_text)
        .filter(|name| !name.is_empty());

    Ok((
        NewUser {
            user_no,
            user_name,
            password_hash: String::new(),
            role: user_data.role,
            user_group: user_data.user_group,
        },
        user_data.password,
    ))
}

pub async fn create_user(
    service: &UserService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (mut new_user, password) = match prepare_new_user(user_data) {
        Ok(prepared) => prepared,
        Err((code, msg)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg)));
        }
    };

    new_user.password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Password hashing failed: {e}");
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Không thể tạo tài khoản",
                )),
            );
        }
    };

    let storage = service.get_storage(request);

    match storage.get_user_by_user_no(&new_user.user_no).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                "Tên đăng nhập đã tồn tại",
            )));
        }
        Ok(None) => {}
        Err(e) => error!("查询用户失败: {e}"),
    }

    match storage.create_user(new_user).await {
        Ok(user) => {
            tracing::info!("User {} created with role {}", user.user_no, user.role);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                UserResponse { user },
                "Tạo tài khoản thành công",
            )))
        }
        Err(e) => {
            let msg = format!("User creation failed: {e}");
            error!("{}", msg);
            // 唯一约束冲突（并发创建）
            if msg.contains("UNIQUE constraint failed") || msg.contains("duplicate key") {
                Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::UserAlreadyExists,
                    "Tên đăng nhập đã tồn tại",
                )))
            } else {
                Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::UserCreationFailed,
                    "Không thể tạo tài khoản",
                )))
            }
        }
    }
}
