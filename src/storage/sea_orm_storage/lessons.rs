//! 课程成果存储操作

use super::SeaOrmStorage;
use crate::entity::lesson_results::{ActiveModel, Column, Entity as LessonResults};
use crate::errors::{LessonHubError, Result};
use crate::models::{
    PaginationInfo,
    lessons::{
        entities::{LessonRecord, NewLesson, VIDEO_MIME_PREFIX},
        requests::LessonListQuery,
        responses::LessonListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 写入课程成果记录，ID 由服务端生成
    pub async fn create_lesson_impl(&self, lesson: NewLesson) -> Result<LessonRecord> {
        let now = chrono::Utc::now().timestamp_millis();

        let model = ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            teacher_id: Set(lesson.teacher_id),
            class_group: Set(lesson.class_group),
            lesson_title: Set(lesson.title),
            lesson_description: Set(lesson.description),
            file_name: Set(lesson.original_file_name),
            file_path: Set(lesson.storage_key),
            file_size: Set(lesson.file_size),
            file_type: Set(lesson.mime_type),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LessonHubError::database_operation(format!("写入课程成果失败: {e}")))?;

        Ok(result.into_lesson())
    }

    /// 通过 ID 获取课程成果
    pub async fn get_lesson_by_id_impl(&self, id: &str) -> Result<Option<LessonRecord>> {
        let result = LessonResults::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| LessonHubError::database_operation(format!("查询课程成果失败: {e}")))?;

        Ok(result.map(|m| m.into_lesson()))
    }

    /// 分页列出课程成果
    pub async fn list_lessons_with_pagination_impl(
        &self,
        query: LessonListQuery,
    ) -> Result<LessonListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = LessonResults::find();

        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        if let Some(class_group) = query.class_group {
            select = select.filter(Column::ClassGroup.eq(class_group));
        }

        if query.videos_only {
            select = select.filter(Column::FileType.starts_with(VIDEO_MIME_PREFIX));
        }

        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            LessonHubError::database_operation(format!("查询课程成果总数失败: {e}"))
        })?;

        let pages = paginator.num_pages().await.map_err(|e| {
            LessonHubError::database_operation(format!("查询课程成果页数失败: {e}"))
        })?;

        let lessons = paginator.fetch_page(page - 1).await.map_err(|e| {
            LessonHubError::database_operation(format!("查询课程成果列表失败: {e}"))
        })?;

        Ok(LessonListResponse {
            items: lessons.into_iter().map(|m| m.into_lesson()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 删除课程成果记录
    pub async fn delete_lesson_impl(&self, id: &str) -> Result<bool> {
        let result = LessonResults::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| LessonHubError::database_operation(format!("删除课程成果失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
