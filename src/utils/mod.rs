pub mod file_magic;
pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod rate_limiter;
pub mod safe_name;
pub mod sanitize;
pub mod upload_guard;
pub mod validate;

pub use file_magic::validate_magic_bytes;
pub use parameter_error_handler::{json_error_handler, query_error_handler};
pub use rate_limiter::{MemoryRateLimitStore, RateLimitCounter, RateLimitStore, RateLimiter};
pub use safe_name::{build_storage_key, create_safe_file_name, derive_storage_key};
pub use sanitize::{sanitize_text, strip_unsafe, validate_text};
pub use upload_guard::{FileMeta, UploadPolicy, validate_upload};

/// 校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(reason.into()),
        }
    }

    /// 转换为 `Result`，失败时携带原因
    pub fn into_result(self) -> Result<(), String> {
        match self.error {
            Some(reason) if !self.valid => Err(reason),
            _ => Ok(()),
        }
    }
}
