//! 课程成果实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lesson_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub teacher_id: i64,
    pub class_group: i32,
    pub lesson_title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub lesson_description: Option<String>,
    pub file_name: String,
    #[sea_orm(unique)]
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TeacherId",
        to = "super::users::Column::Id"
    )]
    Teacher,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_lesson(self) -> crate::models::lessons::entities::LessonRecord {
        use crate::models::lessons::entities::LessonRecord;
        use chrono::{DateTime, Utc};

        LessonRecord {
            id: self.id,
            teacher_id: self.teacher_id,
            class_group: self.class_group,
            title: self.lesson_title,
            description: self.lesson_description,
            original_file_name: self.file_name,
            storage_key: self.file_path,
            file_size: self.file_size,
            mime_type: self.file_type,
            created_at: DateTime::<Utc>::from_timestamp_millis(self.created_at).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp_millis(self.updated_at).unwrap_or_default(),
        }
    }
}
