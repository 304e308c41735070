//! 审计日志实体（只追加）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub table_name: String,
    pub record_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub new_values: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_audit_event(self) -> crate::models::audit::entities::AuditEvent {
        use crate::models::audit::entities::AuditEvent;
        use chrono::{DateTime, Utc};

        AuditEvent {
            id: self.id,
            user_id: self.user_id,
            action: self.action,
            table_name: self.table_name,
            record_id: self.record_id,
            new_values: self
                .new_values
                .and_then(|raw| serde_json::from_str(&raw).ok())
                .unwrap_or(serde_json::Value::Null),
            user_agent: self.user_agent,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
