use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{ObjectStore, check_key};
use crate::errors::{LessonHubError, Result};

/// 进程内对象存储
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, (String, Vec<u8>)>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// 对象的内容类型
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.get(key).map(|entry| entry.0.clone())
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        check_key(key)?;
        match self.objects.entry(key.to_string()) {
            Entry::Occupied(_) => Err(LessonHubError::blob_operation(format!(
                "对象已存在: {key}"
            ))),
            Entry::Vacant(slot) => {
                slot.insert((content_type.to_string(), bytes));
                Ok(())
            }
        }
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.objects.remove(key);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .get(key)
            .map(|entry| entry.1.clone())
            .ok_or_else(|| LessonHubError::not_found(format!("对象不存在: {key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryObjectStore::new();
        store.put("class_1/a.pdf", b"%PDF".to_vec(), "application/pdf").await.unwrap();
        assert!(store.contains("class_1/a.pdf"));
        assert_eq!(store.content_type("class_1/a.pdf").as_deref(), Some("application/pdf"));
        assert!(store.put("class_1/a.pdf", vec![], "application/pdf").await.is_err());

        store.delete(&["class_1/a.pdf".to_string(), "missing".to_string()]).await.unwrap();
        assert!(store.is_empty());
        assert!(store.get("class_1/a.pdf").await.is_err());
    }
}
