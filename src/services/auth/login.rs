use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde_json::json;

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
};
use crate::services::lessons::user_agent;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;

use super::AuthService;

const LOGIN_FAILED_MESSAGE: &str = "Tên đăng nhập hoặc mật khẩu không đúng";

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let monitor = service.get_monitor(request);
    let ua = user_agent(request);
    let user_no = login_request.user_no.trim();

    let user = match storage.get_user_by_user_no(user_no).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            monitor
                .log_login_attempt(None, false, Some("unknown user"), ua.as_deref())
                .await;
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::AuthFailed,
                LOGIN_FAILED_MESSAGE,
            )));
        }
        Err(e) => {
            tracing::error!("登录查询用户失败: {e}");
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Đăng nhập thất bại, vui lòng thử lại",
                )),
            );
        }
    };

    if !verify_password(&login_request.password, &user.password_hash) {
        monitor
            .log_login_attempt(Some(user.id), false, Some("wrong password"), ua.as_deref())
            .await;
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::AuthFailed,
            LOGIN_FAILED_MESSAGE,
        )));
    }

    if !user.is_active() {
        monitor
            .log_suspicious_activity(
                Some(user.id),
                "inactive_account_login",
                json!({ "status": user.status.to_string() }),
                ua.as_deref(),
            )
            .await;
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::UserInactive,
            "Tài khoản đã bị khóa",
        )));
    }

    let access_token = match JwtUtils::generate_access_token(user.id, user.role.as_str()) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Đăng nhập thất bại, không thể tạo token",
                )),
            );
        }
    };

    monitor
        .log_login_attempt(Some(user.id), true, None, ua.as_deref())
        .await;
    tracing::info!("User {} logged in successfully", user.user_no);

    let response = LoginResponse {
        access_token,
        expires_in: JwtUtils::access_token_ttl_secs(),
        user,
        created_at: chrono::Utc::now(),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Đăng nhập thành công")))
}
