use super::entities::LessonRecord;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../bindings/lesson.ts")]
pub struct LessonResponse {
    pub lesson: LessonRecord,
}

// 课程成果列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../bindings/lesson.ts")]
pub struct LessonListResponse {
    pub items: Vec<LessonRecord>,
    pub pagination: PaginationInfo,
}

// 班级视频目录条目，不暴露存储键
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../bindings/lesson.ts")]
pub struct ClassVideo {
    pub id: String,
    pub class_group: i32,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub stream_url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<LessonRecord> for ClassVideo {
    fn from(lesson: LessonRecord) -> Self {
        Self {
            stream_url: format!(
                "/api/v1/classes/{}/videos/{}/stream",
                lesson.class_group, lesson.id
            ),
            id: lesson.id,
            class_group: lesson.class_group,
            title: lesson.title,
            description: lesson.description,
            file_name: lesson.original_file_name,
            file_size: lesson.file_size,
            mime_type: lesson.mime_type,
            created_at: lesson.created_at,
        }
    }
}
