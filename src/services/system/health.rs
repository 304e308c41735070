use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SystemService;
use crate::models::{ApiResponse, ErrorCode, system::responses::HealthResponse};

/// 服务健康状态；数据库不可用时返回 503
pub async fn health(service: &SystemService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let database_ok = match service.get_storage(request) {
        Some(storage) => match storage.count_users().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("健康检查数据库查询失败: {e}");
                false
            }
        },
        None => false,
    };

    let uptime_secs = service
        .get_start_time(request)
        .map(|start| {
            chrono::Utc::now()
                .signed_duration_since(start.start_datetime)
                .num_seconds()
        })
        .unwrap_or_default();

    let response = HealthResponse {
        status: if database_ok { "ok" } else { "degraded" }.to_string(),
        system_name: config.app.system_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.app.environment.clone(),
        database: if database_ok { "up" } else { "down" }.to_string(),
        uptime_secs,
    };

    if database_ok {
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Hệ thống hoạt động bình thường")))
    } else {
        Ok(HttpResponse::ServiceUnavailable().json(ApiResponse::error(
            ErrorCode::InternalServerError,
            response,
            "Cơ sở dữ liệu không khả dụng",
        )))
    }
}
