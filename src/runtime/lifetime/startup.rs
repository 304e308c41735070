use crate::blob::{ObjectStore, create_object_store};
use crate::config::AppConfig;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::NewUser;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::{RateLimiter, UploadPolicy};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_ADMIN_USER_NO: &str = "admin";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub objects: Arc<dyn ObjectStore>,
    pub rate_limiter: RateLimiter,
    pub upload_policy: Arc<UploadPolicy>,
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 初始化默认管理员账号
/// 如果数据库中没有任何用户，则创建一个默认的 admin 账号
pub async fn seed_admin(storage: &Arc<dyn Storage>, password: Option<String>) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    let password = password.unwrap_or_else(|| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return;
        }
    };

    let admin = NewUser {
        user_no: DEFAULT_ADMIN_USER_NO.to_string(),
        user_name: Some("Quản trị viên".to_string()),
        password_hash,
        role: UserRole::Admin,
        user_group: Some(0),
    };

    match storage.create_user(admin).await {
        Ok(user) => {
            info!(
                "Default admin account created successfully (ID: {}, user_no: {})",
                user.id, user.user_no
            );
        }
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
        }
    }
}

/// 准备服务器启动的上下文
/// 包括存储、对象存储、限流计数表和上传策略
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = AppConfig::get();

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage, std::env::var("ADMIN_PASSWORD").ok()).await;

    let objects = create_object_store()
        .await
        .expect("Failed to create object store");
    warn!("Object store backend '{}' initialized", config.blob.backend);

    let upload_policy = Arc::new(UploadPolicy::from(&config.upload));
    debug!(
        "Upload policy: {} MIME types, {} uploads per {} ms",
        upload_policy.allowed_mime_types.len(),
        upload_policy.max_uploads_per_window,
        upload_policy.window_millis
    );

    StartupContext {
        storage,
        objects,
        rate_limiter: RateLimiter::in_memory(),
        upload_policy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeStorage;

    #[test]
    fn test_generated_password_length() {
        let pwd = generate_random_password(16);
        assert_eq!(pwd.chars().count(), 16);
    }

    #[tokio::test]
    async fn test_seed_admin_only_when_empty() {
        let fake = Arc::new(FakeStorage::new());
        let storage: Arc<dyn Storage> = fake.clone();

        seed_admin(&storage, Some("Admin12345".to_string())).await;
        let admin = storage
            .get_user_by_user_no(DEFAULT_ADMIN_USER_NO)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert_eq!(admin.user_group, Some(0));
        assert!(crate::utils::password::verify_password("Admin12345", &admin.password_hash));

        seed_admin(&storage, Some("Other12345".to_string())).await;
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }
}
