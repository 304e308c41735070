use std::sync::Arc;

use crate::models::{
    audit::NewAuditEvent,
    lessons::{
        entities::{LessonRecord, NewLesson},
        requests::LessonListQuery,
        responses::LessonListResponse,
    },
    users::{entities::User, requests::NewUser},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: NewUser) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过登录账号获取用户信息
    async fn get_user_by_user_no(&self, user_no: &str) -> Result<Option<User>>;
    // 用户总数
    async fn count_users(&self) -> Result<u64>;

    /// 课程成果管理方法
    // 写入课程成果记录
    async fn create_lesson(&self, lesson: NewLesson) -> Result<LessonRecord>;
    // 通过ID获取课程成果
    async fn get_lesson_by_id(&self, id: &str) -> Result<Option<LessonRecord>>;
    // 列出课程成果，按创建时间倒序
    async fn list_lessons_with_pagination(
        &self,
        query: LessonListQuery,
    ) -> Result<LessonListResponse>;
    // 删除课程成果记录
    async fn delete_lesson(&self, id: &str) -> Result<bool>;

    /// 审计日志（只追加）
    async fn insert_audit_event(&self, event: NewAuditEvent) -> Result<()>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
