//! 课程成果上传编排
//!
//! 顺序：速率限制 → 文件校验 → 文本清洗 → 生成存储键 → 写对象 → 写记录。
//! 写记录失败时删除刚写入的对象，保证不会留下没有对象的记录。

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::blob::ObjectStore;
use crate::errors::UploadError;
use crate::models::audit::Severity;
use crate::models::lessons::entities::{LessonRecord, NewLesson};
use crate::services::audit::{
    EVENT_LESSON_UPLOADED, EVENT_UPLOAD_FAILED, EVENT_UPLOAD_RATE_LIMITED, EVENT_UPLOAD_REJECTED,
    SecurityMonitor,
};
use crate::storage::Storage;
use crate::utils::{
    FileMeta, RateLimiter, UploadPolicy, derive_storage_key, strip_unsafe, validate_magic_bytes,
    validate_text, validate_upload,
};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// 客户端提交的文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// 原始文件名
    pub name: String,
    /// 声明的 MIME 类型
    pub mime_type: String,
    /// 声明的大小；超出上限时内容可能已被截断
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    fn meta(&self) -> FileMeta<'_> {
        FileMeta {
            name: &self.name,
            size: self.size,
            mime_type: &self.mime_type,
        }
    }
}

pub fn upload_rate_limit_key(teacher_id: i64) -> String {
    format!("upload:teacher:{teacher_id}")
}

#[derive(Clone)]
pub struct LessonUploader {
    storage: Arc<dyn Storage>,
    objects: Arc<dyn ObjectStore>,
    limiter: RateLimiter,
    policy: Arc<UploadPolicy>,
    monitor: SecurityMonitor,
    user_agent: Option<String>,
}

impl LessonUploader {
    pub fn new(
        storage: Arc<dyn Storage>,
        objects: Arc<dyn ObjectStore>,
        limiter: RateLimiter,
        policy: Arc<UploadPolicy>,
    ) -> Self {
        Self {
            monitor: SecurityMonitor::new(storage.clone()),
            storage,
            objects,
            limiter,
            policy,
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// 提交一份课程成果
    pub async fn submit_lesson(
        &self,
        file: UploadedFile,
        teacher_id: i64,
        class_group: i32,
        title: &str,
        description: Option<&str>,
    ) -> Result<LessonRecord, UploadError> {
        // 1. 速率限制
        let limit_key = upload_rate_limit_key(teacher_id);
        if !self.limiter.check_rate_limit(
            &limit_key,
            self.policy.max_uploads_per_window,
            self.policy.window_millis,
        ) {
            warn!(teacher_id, "上传频率超限");
            self.monitor
                .log_security_event(
                    Some(teacher_id),
                    EVENT_UPLOAD_RATE_LIMITED,
                    json!({ "key": limit_key, "file_name": file.name }),
                    Severity::Medium,
                    self.user_agent.as_deref(),
                )
                .await;
            return Err(UploadError::RateLimited);
        }

        // 2. 文件校验
        if let Err(reason) = self.check_file(&file) {
            info!(teacher_id, file_name = %file.name, "上传被拒绝: {reason}");
            self.monitor
                .log_security_event(
                    Some(teacher_id),
                    EVENT_UPLOAD_REJECTED,
                    json!({
                        "file_name": file.name,
                        "file_size": file.size,
                        "file_type": file.mime_type,
                        "reason": reason,
                    }),
                    Severity::Medium,
                    self.user_agent.as_deref(),
                )
                .await;
            return Err(UploadError::ValidationFailed(reason));
        }

        // 3. 标题与描述
        let (title, description) = clean_text_fields(title, description)?;

        // 4. 存储键
        let storage_key = derive_storage_key(class_group, &file.name);
        debug!(teacher_id, class_group, storage_key = %storage_key, "生成存储键");

        let new_lesson = NewLesson {
            teacher_id,
            class_group,
            title,
            description,
            original_file_name: file.name,
            storage_key,
            file_size: file.size as i64,
            mime_type: file.mime_type,
        };

        // 5-7 在独立任务中执行，请求被取消时补偿删除仍会完成
        let task = tokio::spawn(persist_lesson(
            self.storage.clone(),
            self.objects.clone(),
            self.monitor.clone(),
            self.user_agent.clone(),
            new_lesson,
            file.bytes,
        ));

        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("上传任务异常终止: {e}");
                Err(UploadError::MetadataWriteFailed(e.to_string()))
            }
        }
    }

    fn check_file(&self, file: &UploadedFile) -> Result<(), String> {
        validate_upload(&file.meta(), &self.policy).into_result()?;

        if self.policy.verify_content_signature
            && !validate_magic_bytes(&file.bytes, &file.mime_type)
        {
            return Err("Nội dung file không khớp với loại file đã chọn".to_string());
        }
        Ok(())
    }
}

/// 清洗并校验标题与描述，空描述视为未填写
fn clean_text_fields(
    title: &str,
    description: Option<&str>,
) -> Result<(String, Option<String>), UploadError> {
    let title = strip_unsafe(title);
    if title.is_empty() {
        return Err(UploadError::ValidationFailed(
            "Vui lòng nhập tiêu đề bài học".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(UploadError::ValidationFailed(format!(
            "Tiêu đề không được vượt quá {MAX_TITLE_CHARS} ký tự"
        )));
    }

    let description = description.map(strip_unsafe).filter(|d| !d.is_empty());
    if let Some(ref d) = description
        && d.chars().count() > MAX_DESCRIPTION_CHARS
    {
        return Err(UploadError::ValidationFailed(format!(
            "Mô tả không được vượt quá {MAX_DESCRIPTION_CHARS} ký tự"
        )));
    }

    validate_text(&title, MAX_TITLE_CHARS)
        .into_result()
        .map_err(UploadError::ValidationFailed)?;
    if let Some(ref d) = description {
        validate_text(d, MAX_DESCRIPTION_CHARS)
            .into_result()
            .map_err(UploadError::ValidationFailed)?;
    }

    Ok((title, description))
}

async fn persist_lesson(
    storage: Arc<dyn Storage>,
    objects: Arc<dyn ObjectStore>,
    monitor: SecurityMonitor,
    user_agent: Option<String>,
    lesson: NewLesson,
    bytes: Vec<u8>,
) -> Result<LessonRecord, UploadError> {
    let teacher_id = lesson.teacher_id;
    let storage_key = lesson.storage_key.clone();
    let file_name = lesson.original_file_name.clone();

    let result = write_blob_then_record(&storage, &objects, lesson, bytes).await;

    match &result {
        Ok(record) => {
            info!(lesson_id = %record.id, storage_key = %record.storage_key, "课程成果上传成功");
            monitor
                .log_security_event(
                    Some(teacher_id),
                    EVENT_LESSON_UPLOADED,
                    json!({
                        "lesson_id": record.id,
                        "class_group": record.class_group,
                        "file_name": record.original_file_name,
                        "file_size": record.file_size,
                    }),
                    Severity::Low,
                    user_agent.as_deref(),
                )
                .await;
        }
        Err(e) => {
            error!(
                teacher_id,
                storage_key = %storage_key,
                code = e.code(),
                "课程成果上传失败: {}",
                e.cause().unwrap_or_default()
            );
            monitor
                .log_security_event(
                    Some(teacher_id),
                    EVENT_UPLOAD_FAILED,
                    json!({
                        "file_name": file_name,
                        "storage_key": storage_key,
                        "code": e.code(),
                    }),
                    Severity::Medium,
                    user_agent.as_deref(),
                )
                .await;
        }
    }

    result
}

async fn write_blob_then_record(
    storage: &Arc<dyn Storage>,
    objects: &Arc<dyn ObjectStore>,
    lesson: NewLesson,
    bytes: Vec<u8>,
) -> Result<LessonRecord, UploadError> {
    let storage_key = lesson.storage_key.clone();

    // 5. 写对象
    objects
        .put(&storage_key, bytes, &lesson.mime_type)
        .await
        .map_err(|e| UploadError::StorageWriteFailed(e.to_string()))?;
    debug!(storage_key = %storage_key, "对象写入完成");

    // 6. 写记录，失败时补偿删除对象
    match storage.create_lesson(lesson).await {
        Ok(record) => Ok(record),
        Err(e) => {
            if let Err(delete_err) = objects.delete(std::slice::from_ref(&storage_key)).await {
                let compensation = UploadError::CompensatingDeleteFailed(format!(
                    "{storage_key}: {delete_err}"
                ));
                error!("{compensation}");
            } else {
                warn!(storage_key = %storage_key, "记录写入失败，已删除对象");
            }
            Err(UploadError::MetadataWriteFailed(e.to_string()))
        }
    }
}
