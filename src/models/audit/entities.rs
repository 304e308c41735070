use serde::{Deserialize, Serialize};

/// 安全事件的严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// 安全事件写入的表名
pub const SECURITY_EVENTS_TABLE: &str = "security_events";

// 待写入的审计事件
#[derive(Debug, Clone)]
pub struct NewAuditEvent {
    pub user_id: Option<i64>,
    pub action: String,
    pub table_name: String,
    pub record_id: Option<String>,
    pub new_values: serde_json::Value,
    pub user_agent: Option<String>,
}

// 已写入的审计事件
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub table_name: String,
    pub record_id: Option<String>,
    pub new_values: serde_json::Value,
    pub user_agent: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
