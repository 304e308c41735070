//! 对象存储边界
//!
//! 课程成果文件按存储键写入对象存储，关系库只保存键与元数据。

mod local;
mod memory;

pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::{LessonHubError, Result};

#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// 写入对象，键已存在时失败
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;
    /// 删除对象，不存在的键忽略
    async fn delete(&self, keys: &[String]) -> Result<()>;
    /// 读取对象，不存在时返回 NotFound
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}

/// 拒绝越出存储根目录的键
pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.contains("..")
        || key.contains('\0')
        || key.starts_with('/')
        || key.starts_with('\\')
        || std::path::Path::new(key).is_absolute()
    {
        return Err(LessonHubError::blob_operation(format!(
            "非法的存储键: {key:?}"
        )));
    }
    Ok(())
}

/// 根据 `blob.backend` 创建对象存储
pub async fn create_object_store() -> Result<Arc<dyn ObjectStore>> {
    let config = AppConfig::get();
    match config.blob.backend.as_str() {
        "local" => Ok(Arc::new(LocalObjectStore::new(&config.upload.dir).await?)),
        "memory" => Ok(Arc::new(MemoryObjectStore::new())),
        other => Err(LessonHubError::blob_plugin_not_found(format!(
            "未知的对象存储后端: {other}. 支持: local, memory"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_key() {
        assert!(check_key("class_2/1700000000000_ab12cd_Bai.pdf").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("../etc/passwd").is_err());
        assert!(check_key("class_2/../../x").is_err());
        assert!(check_key("/abs/path").is_err());
        assert!(check_key("a\0b").is_err());
    }
}
