use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 课程成果列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../bindings/lesson.ts")]
pub struct LessonListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub class_group: Option<i32>,
    pub teacher_id: Option<i64>,
}

// 课程成果列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct LessonListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_group: Option<i32>,
    pub teacher_id: Option<i64>,
    /// 只查询视频类型（`video/*`）
    pub videos_only: bool,
}

impl LessonListQuery {
    /// 某个班级的视频目录
    pub fn class_videos(class_group: i32, pagination: PaginationQuery) -> Self {
        Self {
            page: Some(pagination.page),
            size: Some(pagination.size),
            class_group: Some(class_group),
            teacher_id: None,
            videos_only: true,
        }
    }
}

impl From<LessonListParams> for LessonListQuery {
    fn from(params: LessonListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            class_group: params.class_group,
            teacher_id: params.teacher_id,
            videos_only: false,
        }
    }
}
