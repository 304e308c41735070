use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::UserNo)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::UserName).string().null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::UserGroup).integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建课程成果表
        manager
            .create_table(
                Table::create()
                    .table(LessonResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LessonResults::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LessonResults::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LessonResults::ClassGroup)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LessonResults::LessonTitle)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LessonResults::LessonDescription)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(LessonResults::FileName).string().not_null())
                    .col(
                        ColumnDef::new(LessonResults::FilePath)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(LessonResults::FileSize)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LessonResults::FileType).string().not_null())
                    .col(
                        ColumnDef::new(LessonResults::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LessonResults::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LessonResults::Table, LessonResults::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lesson_results_teacher_id")
                    .table(LessonResults::Table)
                    .col(LessonResults::TeacherId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // ==================== 审计日志表 ====================
        manager
            .create_table(
                Table::create()
                    .table(AuditLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLog::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditLog::UserId).big_integer().null())
                    .col(ColumnDef::new(AuditLog::Action).string().not_null())
                    .col(ColumnDef::new(AuditLog::TableName).string().not_null())
                    .col(ColumnDef::new(AuditLog::RecordId).string().null())
                    .col(ColumnDef::new(AuditLog::NewValues).text().null())
                    .col(ColumnDef::new(AuditLog::UserAgent).string().null())
                    .col(ColumnDef::new(AuditLog::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LessonResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    UserNo,
    UserName,
    PasswordHash,
    Role,
    Status,
    UserGroup,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LessonResults {
    #[sea_orm(iden = "lesson_results")]
    Table,
    Id,
    TeacherId,
    ClassGroup,
    LessonTitle,
    LessonDescription,
    FileName,
    FilePath,
    FileSize,
    FileType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AuditLog {
    #[sea_orm(iden = "audit_log")]
    Table,
    Id,
    UserId,
    Action,
    TableName,
    RecordId,
    NewValues,
    UserAgent,
    CreatedAt,
}
