//! 安全事件审计
//!
//! 写入失败只记录 warn 日志，不影响调用方的业务结果。

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::models::audit::{NewAuditEvent, SECURITY_EVENTS_TABLE, Severity};
use crate::storage::Storage;

pub const EVENT_LOGIN_ATTEMPT: &str = "login_attempt";
pub const EVENT_UNAUTHORIZED_ACCESS: &str = "unauthorized_access";
pub const EVENT_SUSPICIOUS_ACTIVITY: &str = "suspicious_activity";
pub const EVENT_UPLOAD_RATE_LIMITED: &str = "upload_rate_limited";
pub const EVENT_UPLOAD_REJECTED: &str = "upload_rejected";
pub const EVENT_UPLOAD_FAILED: &str = "upload_failed";
pub const EVENT_LESSON_UPLOADED: &str = "lesson_uploaded";
pub const EVENT_LESSON_DELETED: &str = "lesson_deleted";

#[derive(Clone)]
pub struct SecurityMonitor {
    storage: Arc<dyn Storage>,
}

impl SecurityMonitor {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 记录安全事件
    ///
    /// `data` 必须是 JSON 对象，写入前会附加 `severity` 与 `timestamp`。
    pub async fn log_security_event(
        &self,
        user_id: Option<i64>,
        event_type: &str,
        data: Value,
        severity: Severity,
        user_agent: Option<&str>,
    ) {
        let mut new_values = match data {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("details".to_string(), other);
                map
            }
        };
        new_values.insert("severity".to_string(), json!(severity.as_str()));
        new_values.insert(
            "timestamp".to_string(),
            json!(chrono::Utc::now().to_rfc3339()),
        );

        let event = NewAuditEvent {
            user_id,
            action: event_type.to_string(),
            table_name: SECURITY_EVENTS_TABLE.to_string(),
            record_id: None,
            new_values: Value::Object(new_values),
            user_agent: user_agent.map(str::to_string),
        };

        match self.storage.insert_audit_event(event).await {
            Ok(()) => debug!(event = event_type, "安全事件已记录"),
            Err(e) => warn!(event = event_type, "安全事件写入失败: {e}"),
        }
    }

    pub async fn log_login_attempt(
        &self,
        user_id: Option<i64>,
        success: bool,
        error: Option<&str>,
        user_agent: Option<&str>,
    ) {
        let severity = if success {
            Severity::Low
        } else {
            Severity::Medium
        };
        self.log_security_event(
            user_id,
            EVENT_LOGIN_ATTEMPT,
            json!({ "success": success, "error": error, "user_id": user_id }),
            severity,
            user_agent,
        )
        .await;
    }

    pub async fn log_unauthorized_access(
        &self,
        user_id: Option<i64>,
        resource: &str,
        attempted_action: &str,
        user_agent: Option<&str>,
    ) {
        self.log_security_event(
            user_id,
            EVENT_UNAUTHORIZED_ACCESS,
            json!({
                "resource": resource,
                "attempted_action": attempted_action,
                "user_id": user_id,
            }),
            Severity::High,
            user_agent,
        )
        .await;
    }

    pub async fn log_suspicious_activity(
        &self,
        user_id: Option<i64>,
        activity: &str,
        details: Value,
        user_agent: Option<&str>,
    ) {
        self.log_security_event(
            user_id,
            EVENT_SUSPICIOUS_ACTIVITY,
            json!({ "activity": activity, "details": details, "user_id": user_id }),
            Severity::High,
            user_agent,
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeStorage;

    #[tokio::test]
    async fn test_event_carries_severity_and_timestamp() {
        let storage = Arc::new(FakeStorage::new());
        let monitor = SecurityMonitor::new(storage.clone());

        monitor
            .log_unauthorized_access(Some(3), "lesson:abc", "download", Some("curl/8"))
            .await;

        let events = storage.audit_events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.action, EVENT_UNAUTHORIZED_ACCESS);
        assert_eq!(event.table_name, SECURITY_EVENTS_TABLE);
        assert_eq!(event.new_values["severity"], "high");
        assert_eq!(event.new_values["resource"], "lesson:abc");
        assert!(event.new_values["timestamp"].is_string());
        assert_eq!(event.user_agent.as_deref(), Some("curl/8"));
    }

    #[tokio::test]
    async fn test_login_attempt_severity() {
        let storage = Arc::new(FakeStorage::new());
        let monitor = SecurityMonitor::new(storage.clone());

        monitor.log_login_attempt(Some(1), true, None, None).await;
        monitor
            .log_login_attempt(None, false, Some("bad password"), None)
            .await;

        let events = storage.audit_events();
        assert_eq!(events[0].new_values["severity"], "low");
        assert_eq!(events[1].new_values["severity"], "medium");
        assert_eq!(events[1].new_values["error"], "bad password");
    }

    #[tokio::test]
    async fn test_audit_failure_is_swallowed() {
        let storage = Arc::new(FakeStorage::new());
        storage.fail_audit(true);
        let monitor = SecurityMonitor::new(storage.clone());

        monitor
            .log_suspicious_activity(None, "probe", json!({ "path": "/x" }), None)
            .await;
        assert!(storage.audit_events().is_empty());
    }
}
