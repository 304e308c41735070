use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{LessonHubError, Result};
use crate::models::users::{
    entities::{User, UserStatus},
    requests::NewUser,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: NewUser) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_no: Set(req.user_no),
            user_name: Set(req.user_name),
            password_hash: Set(req.password_hash),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            user_group: Set(req.user_group),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LessonHubError::database_operation(format!("创建用户失败: {e}")))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LessonHubError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过登录账号获取用户
    pub async fn get_user_by_user_no_impl(&self, user_no: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::UserNo.eq(user_no))
            .one(&self.db)
            .await
            .map_err(|e| LessonHubError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 用户总数
    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(|e| LessonHubError::database_operation(format!("查询用户总数失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::memory_storage;
    use crate::models::users::{entities::UserRole, requests::NewUser};

    fn new_user(user_no: &str, role: UserRole) -> NewUser {
        NewUser {
            user_no: user_no.to_string(),
            user_name: Some("Nguyễn Văn A".to_string()),
            password_hash: "$argon2id$placeholder".to_string(),
            role,
            user_group: Some(2),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let storage = memory_storage().await;
        let created = storage
            .create_user_impl(new_user("gv_007", UserRole::Teacher))
            .await
            .unwrap();
        assert!(created.is_active());

        let by_id = storage.get_user_by_id_impl(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.user_no, "gv_007");
        assert_eq!(by_id.role, UserRole::Teacher);
        assert_eq!(by_id.user_group, Some(2));

        let by_no = storage.get_user_by_user_no_impl("gv_007").await.unwrap();
        assert_eq!(by_no.map(|u| u.id), Some(created.id));
        assert!(storage.get_user_by_user_no_impl("nobody").await.unwrap().is_none());
        assert_eq!(storage.count_users_impl().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_user_no_rejected() {
        let storage = memory_storage().await;
        storage
            .create_user_impl(new_user("admin", UserRole::Admin))
            .await
            .unwrap();
        assert!(
            storage
                .create_user_impl(new_user("admin", UserRole::Teacher))
                .await
                .is_err()
        );
    }
}
