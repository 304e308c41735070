//! 审计日志存储操作

use super::SeaOrmStorage;
use crate::entity::audit_log::ActiveModel;
use crate::errors::{LessonHubError, Result};
use crate::models::audit::NewAuditEvent;
use sea_orm::{ActiveModelTrait, Set};

impl SeaOrmStorage {
    /// 追加一条审计事件
    pub async fn insert_audit_event_impl(&self, event: NewAuditEvent) -> Result<()> {
        let model = ActiveModel {
            user_id: Set(event.user_id),
            action: Set(event.action),
            table_name: Set(event.table_name),
            record_id: Set(event.record_id),
            new_values: Set(Some(serde_json::to_string(&event.new_values)?)),
            user_agent: Set(event.user_agent),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| LessonHubError::database_operation(format!("写入审计日志失败: {e}")))?;

        Ok(())
    }
}
