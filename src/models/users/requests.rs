use super::entities::UserRole;
use serde::Deserialize;
use ts_rs::TS;

// 用户创建请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../bindings/user.ts")]
pub struct CreateUserRequest {
    pub user_no: String,
    pub user_name: Option<String>,
    pub password: String,
    pub role: UserRole,
    pub user_group: Option<i32>,
}

// 用户创建参数（用于存储层）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_no: String,
    pub user_name: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
    pub user_group: Option<i32>,
}
