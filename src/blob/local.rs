use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::{ObjectStore, check_key};
use crate::errors::{LessonHubError, Result};

/// 本地文件系统对象存储
#[derive(Clone)]
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            LessonHubError::blob_operation(format!(
                "创建存储目录失败 {}: {e}",
                base_path.display()
            ))
        })?;
        info!("本地对象存储目录: {}", base_path.display());
        Ok(Self { base_path })
    }

    fn key_to_path(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        let path = self.key_to_path(key)?;
        Self::ensure_parent_dir(&path).await?;

        // create_new 保证不会覆盖已有对象
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                LessonHubError::blob_operation(format!("创建文件失败 {}: {e}", path.display()))
            })?;

        let written: std::io::Result<()> = async {
            file.write_all(&bytes).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(LessonHubError::blob_operation(format!(
                "写入文件失败 {}: {e}",
                path.display()
            )));
        }

        debug!(key = %key, size_bytes = bytes.len(), "本地对象写入完成");
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            let path = self.key_to_path(key)?;
            match fs::remove_file(&path).await {
                Ok(()) => debug!(key = %key, "本地对象已删除"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(LessonHubError::blob_operation(format!(
                        "删除文件失败 {}: {e}",
                        path.display()
                    )));
                }
            }
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.key_to_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LessonHubError::not_found(format!("对象不存在: {key}")))
            }
            Err(e) => Err(LessonHubError::blob_operation(format!(
                "读取文件失败 {}: {e}",
                path.display()
            ))),
        }
    }
}
