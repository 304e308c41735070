//! 测试用的存储替身与样例数据

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::blob::{MemoryObjectStore, ObjectStore};
use crate::errors::{LessonHubError, Result};
use crate::models::{
    PaginationInfo,
    audit::NewAuditEvent,
    lessons::{
        entities::{LessonRecord, NewLesson},
        requests::LessonListQuery,
        responses::LessonListResponse,
    },
    users::{
        entities::{User, UserRole, UserStatus},
        requests::NewUser,
    },
};
use crate::storage::Storage;

/// 进程内 Storage，带失败开关
#[derive(Default)]
pub struct FakeStorage {
    users: Mutex<Vec<User>>,
    lessons: Mutex<Vec<LessonRecord>>,
    audit: Mutex<Vec<NewAuditEvent>>,
    next_user_id: AtomicI64,
    fail_create_lesson: AtomicBool,
    fail_audit: AtomicBool,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self {
            next_user_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    pub fn fail_create_lesson(&self, fail: bool) {
        self.fail_create_lesson.store(fail, Ordering::SeqCst);
    }

    pub fn fail_audit(&self, fail: bool) {
        self.fail_audit.store(fail, Ordering::SeqCst);
    }

    pub fn audit_events(&self) -> Vec<NewAuditEvent> {
        self.audit.lock().unwrap().clone()
    }

    pub fn audit_actions(&self) -> Vec<String> {
        self.audit_events().into_iter().map(|e| e.action).collect()
    }

    pub fn lessons(&self) -> Vec<LessonRecord> {
        self.lessons.lock().unwrap().clone()
    }

    pub fn set_user_group(&self, id: i64, group: Option<i32>) {
        if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
            user.user_group = group;
        }
    }

    /// 直接插入一个指定 ID 的用户
    pub fn insert_user(&self, id: i64, user_no: &str, role: UserRole) -> User {
        let user = sample_user(id, user_no, role);
        self.users.lock().unwrap().push(user.clone());
        self.next_user_id.fetch_max(id + 1, Ordering::SeqCst);
        user
    }
}

pub fn sample_user(id: i64, user_no: &str, role: UserRole) -> User {
    let now = chrono::Utc::now();
    User {
        id,
        user_no: user_no.to_string(),
        user_name: None,
        password_hash: String::new(),
        role,
        status: UserStatus::Active,
        user_group: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.user_no == user.user_no) {
            return Err(LessonHubError::database_operation("UNIQUE constraint failed: users.user_no"));
        }
        let mut created = sample_user(
            self.next_user_id.fetch_add(1, Ordering::SeqCst),
            &user.user_no,
            user.role,
        );
        created.user_name = user.user_name;
        created.user_group = user.user_group;
        created.password_hash = user.password_hash;
        users.push(created.clone());
        Ok(created)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_user_no(&self, user_no: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_no == user_no)
            .cloned())
    }

    async fn count_users(&self) -> Result<u64> {
        Ok(self.users.lock().unwrap().len() as u64)
    }

    async fn create_lesson(&self, lesson: NewLesson) -> Result<LessonRecord> {
        if self.fail_create_lesson.load(Ordering::SeqCst) {
            return Err(LessonHubError::database_operation("database is locked"));
        }
        let mut lessons = self.lessons.lock().unwrap();
        if lessons.iter().any(|l| l.storage_key == lesson.storage_key) {
            return Err(LessonHubError::database_operation(
                "UNIQUE constraint failed: lesson_results.file_path",
            ));
        }
        let now = chrono::Utc::now();
        let record = LessonRecord {
            id: uuid::Uuid::new_v4().to_string(),
            teacher_id: lesson.teacher_id,
            class_group: lesson.class_group,
            title: lesson.title,
            description: lesson.description,
            original_file_name: lesson.original_file_name,
            storage_key: lesson.storage_key,
            file_size: lesson.file_size,
            mime_type: lesson.mime_type,
            created_at: now,
            updated_at: now,
        };
        lessons.push(record.clone());
        Ok(record)
    }

    async fn get_lesson_by_id(&self, id: &str) -> Result<Option<LessonRecord>> {
        Ok(self.lessons.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn list_lessons_with_pagination(
        &self,
        query: LessonListQuery,
    ) -> Result<LessonListResponse> {
        let page = query.page.unwrap_or(1).max(1);
        let size = query.size.unwrap_or(10).clamp(1, 100);

        let mut matched: Vec<LessonRecord> = self
            .lessons
            .lock()
            .unwrap()
            .iter()
            .filter(|l| query.teacher_id.is_none_or(|id| l.teacher_id == id))
            .filter(|l| query.class_group.is_none_or(|g| l.class_group == g))
            .filter(|l| !query.videos_only || l.is_video())
            .cloned()
            .collect();
        matched.reverse();

        let total = matched.len() as i64;
        let items = matched
            .into_iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .collect();

        Ok(LessonListResponse {
            items,
            pagination: PaginationInfo {
                page,
                page_size: size,
                total,
                total_pages: (total + size - 1) / size,
            },
        })
    }

    async fn delete_lesson(&self, id: &str) -> Result<bool> {
        let mut lessons = self.lessons.lock().unwrap();
        let before = lessons.len();
        lessons.retain(|l| l.id != id);
        Ok(lessons.len() != before)
    }

    async fn insert_audit_event(&self, event: NewAuditEvent) -> Result<()> {
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(LessonHubError::database_operation("audit_log unavailable"));
        }
        self.audit.lock().unwrap().push(event);
        Ok(())
    }
}

/// 可以注入写入或删除失败的对象存储
///
/// `hold_put(true)` 时写入完成后停住，直到 `release_put`。
#[derive(Default)]
pub struct FlakyObjectStore {
    pub inner: MemoryObjectStore,
    fail_put: AtomicBool,
    fail_delete: AtomicBool,
    hold_put: AtomicBool,
    put_written: Notify,
    put_release: Notify,
}

impl FlakyObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_put(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn hold_put(&self, hold: bool) {
        self.hold_put.store(hold, Ordering::SeqCst);
    }

    /// 等待被停住的写入落盘
    pub async fn wait_put_written(&self) {
        self.put_written.notified().await;
    }

    pub fn release_put(&self) {
        self.put_release.notify_one();
    }
}

#[async_trait]
impl ObjectStore for FlakyObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(LessonHubError::blob_operation("bucket unavailable"));
        }
        self.inner.put(key, bytes, content_type).await?;
        if self.hold_put.load(Ordering::SeqCst) {
            self.put_written.notify_one();
            self.put_release.notified().await;
        }
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(LessonHubError::blob_operation("delete timed out"));
        }
        self.inner.delete(keys).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.inner.get(key).await
    }
}

/// 以 `%PDF` 开头的指定大小的文件内容
pub fn pdf_bytes(size: usize) -> Vec<u8> {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.resize(size.max(data.len()), b'0');
    data
}
