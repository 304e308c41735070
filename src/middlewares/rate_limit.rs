/*!
 * 速率限制中间件
 *
 * 计数保存在共享的 [`RateLimiter`] 中（通过 app_data 注入），
 * 与上传编排使用同一个计数表。
 *
 * ```rust,ignore
 * web::scope("/api/v1/auth")
 *     .wrap(RateLimit::login())  // 5次/15分钟
 *     .route("/login", web::post().to(login_handler))
 * ```
 *
 * - 已认证请求按用户 ID 计数，否则按客户端 IP
 * - 超过限制返回 429 Too Many Requests
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode};
use crate::utils::RateLimiter;

pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// 速率限制配置
#[derive(Clone)]
pub struct RateLimit {
    /// 时间窗口内允许的最大请求数
    max_requests: u32,
    /// 时间窗口（毫秒）
    window_millis: i64,
    /// 限制键前缀（用于区分不同端点）
    key_prefix: String,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_millis: i64) -> Self {
        Self {
            max_requests,
            window_millis,
            key_prefix: String::new(),
        }
    }

    /// 设置限制键前缀
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 登录端点限制：5次/15分钟/IP
    pub fn login() -> Self {
        Self::new(5, 15 * 60 * 1000).with_prefix("login")
    }

    /// 通用 API 限制：100次/分钟/用户
    pub fn api() -> Self {
        Self::new(100, 60 * 1000).with_prefix("api")
    }

    fn key_for(&self, identifier: &str) -> String {
        if self.key_prefix.is_empty() {
            identifier.to_string()
        } else {
            format!("{}:{}", self.key_prefix, identifier)
        }
    }
}

/// 从请求中提取客户端 IP
///
/// 部署在反向代理后时需要代理正确设置 X-Forwarded-For / X-Real-IP。
fn extract_client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    // 只取第一个 IP（最接近客户端的）
    if let Some(forwarded) = req.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    if let Some(real_ip) = req.headers().get("X-Real-IP")
        && let Ok(ip) = real_ip.to_str()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

fn is_valid_ip(ip: &str) -> bool {
    use std::net::IpAddr;
    ip.parse::<IpAddr>().is_ok()
}

/// 从请求中提取用户 ID（如果已认证）
fn extract_user_id(req: &ServiceRequest) -> Option<i64> {
    use crate::models::users::entities::User;
    req.extensions().get::<User>().map(|user| user.id)
}

/// 创建速率限制错误响应
fn create_rate_limit_response(retry_after_secs: i64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after_secs.max(1).to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Bạn đã thao tác quá nhiều lần, vui lòng thử lại sau",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            config: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    config: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let identifier = extract_user_id(&req)
                .map(|id| format!("user:{}", id))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));
            let key = config.key_for(&identifier);

            let limiter = req
                .app_data::<web::Data<RateLimiter>>()
                .expect("RateLimiter not found in app data")
                .get_ref()
                .clone();

            let now = chrono::Utc::now().timestamp_millis();
            if !limiter.check_rate_limit_at(&key, config.max_requests, config.window_millis, now)
            {
                let retry_after = limiter
                    .counter(&key)
                    .map(|c| (c.window_reset_at - now) / 1000)
                    .unwrap_or(config.window_millis / 1000);
                warn!(
                    "Rate limit exceeded for key: {} (limit: {})",
                    key, config.max_requests
                );
                return Ok(req.into_response(
                    create_rate_limit_response(retry_after).map_into_right_body(),
                ));
            }

            let remaining = limiter
                .counter(&key)
                .map(|c| config.max_requests.saturating_sub(c.count))
                .unwrap_or(config.max_requests);
            let info = RateLimitInfo {
                remaining,
                limit: config.max_requests,
            };

            let mut res = srv.call(req).await?;
            info.apply(res.headers_mut());
            Ok(res.map_into_left_body())
        })
    }
}

/// 速率限制信息，写入放行请求的响应头
#[derive(Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: u32,
    pub limit: u32,
}

impl RateLimitInfo {
    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(
            HeaderName::from_static(RATE_LIMIT_LIMIT_HEADER),
            HeaderValue::from(self.limit),
        );
        headers.insert(
            HeaderName::from_static(RATE_LIMIT_REMAINING_HEADER),
            HeaderValue::from(self.remaining),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test as actix_test};

    #[test]
    fn test_rate_limit_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window_millis, 900_000);
        assert_eq!(login.key_prefix, "login");

        let api = RateLimit::api();
        assert_eq!(api.max_requests, 100);
        assert_eq!(api.key_for("ip:1.2.3.4"), "api:ip:1.2.3.4");
    }

    #[actix_web::test]
    async fn test_sixth_login_rejected() {
        let limiter = RateLimiter::in_memory();
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(limiter.clone())).service(
                web::scope("/auth")
                    .wrap(RateLimit::login())
                    .route("/login", web::post().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        for i in 0..5u32 {
            let req = actix_test::TestRequest::post()
                .uri("/auth/login")
                .peer_addr("10.0.0.1:4000".parse().unwrap())
                .to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(
                resp.headers().get(RATE_LIMIT_LIMIT_HEADER).unwrap(),
                "5"
            );
            assert_eq!(
                resp.headers().get(RATE_LIMIT_REMAINING_HEADER).unwrap(),
                (4 - i).to_string().as_str()
            );
        }

        let req = actix_test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr("10.0.0.1:4000".parse().unwrap())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key("Retry-After"));

        // 其他 IP 不受影响
        let req = actix_test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr("10.0.0.2:4000".parse().unwrap())
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

        assert_eq!(
            limiter.counter("login:ip:10.0.0.1").map(|c| c.count),
            Some(5)
        );
    }
}
