use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程成果记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../bindings/lesson.ts")]
pub struct LessonRecord {
    pub id: String,
    pub teacher_id: i64,
    pub class_group: i32,
    pub title: String,
    pub description: Option<String>,
    /// 上传时的原始文件名，仅用于展示和下载
    pub original_file_name: String,
    /// 对象存储中的键，全局唯一
    pub storage_key: String,
    pub file_size: i64,
    pub mime_type: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub const VIDEO_MIME_PREFIX: &str = "video/";

impl LessonRecord {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.teacher_id == user_id
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with(VIDEO_MIME_PREFIX)
    }
}

// 新建课程成果（用于存储层）
#[derive(Debug, Clone)]
pub struct NewLesson {
    pub teacher_id: i64,
    pub class_group: i32,
    pub title: String,
    pub description: Option<String>,
    pub original_file_name: String,
    pub storage_key: String,
    pub file_size: i64,
    pub mime_type: String,
}
