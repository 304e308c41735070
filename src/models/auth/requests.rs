use serde::Deserialize;
use ts_rs::TS;

// 用户登录请求（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../bindings/auth.ts")]
pub struct LoginRequest {
    /// 登录账号
    pub user_no: String,
    /// 密码
    pub password: String,
}
