//! 预导入模块，方便使用

pub use super::audit_log::{
    ActiveModel as AuditLogActiveModel, Entity as AuditLogs, Model as AuditLogModel,
};
pub use super::lesson_results::{
    ActiveModel as LessonResultActiveModel, Entity as LessonResults, Model as LessonResultModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
