//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 上传流水线另有独立的 [`UploadError`]，区分限流、校验、存储写入与元数据写入失败。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_lesson_hub_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum LessonHubError {
            $($variant(String),)*
        }

        impl LessonHubError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(LessonHubError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(LessonHubError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(LessonHubError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl LessonHubError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        LessonHubError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_lesson_hub_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    BlobOperation("E004", "Blob Storage Error"),
    BlobPluginNotFound("E005", "Blob Storage Plugin Not Found"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
}

impl LessonHubError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LessonHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LessonHubError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LessonHubError {
    fn from(err: sea_orm::DbErr) -> Self {
        LessonHubError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LessonHubError {
    fn from(err: std::io::Error) -> Self {
        LessonHubError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LessonHubError {
    fn from(err: serde_json::Error) -> Self {
        LessonHubError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LessonHubError>;

/// 课程上传流水线错误
///
/// `user_message()` 是直接展示给用户的文案；`cause()` 只写入日志。
#[derive(Debug, Clone, PartialEq)]
pub enum UploadError {
    /// 超出上传频率限制
    RateLimited,
    /// 文件或文本校验未通过，携带面向用户的原因
    ValidationFailed(String),
    /// 对象存储写入失败
    StorageWriteFailed(String),
    /// 课程记录写入失败（已尝试删除刚写入的文件）
    MetadataWriteFailed(String),
    /// 补偿删除失败，仅记录日志，不返回给调用方
    CompensatingDeleteFailed(String),
}

impl UploadError {
    pub fn code(&self) -> &'static str {
        match self {
            UploadError::RateLimited => "U001",
            UploadError::ValidationFailed(_) => "U002",
            UploadError::StorageWriteFailed(_) => "U003",
            UploadError::MetadataWriteFailed(_) => "U004",
            UploadError::CompensatingDeleteFailed(_) => "U005",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            UploadError::RateLimited => {
                "Bạn đã tải lên quá nhiều lần. Vui lòng thử lại sau.".to_string()
            }
            UploadError::ValidationFailed(reason) => reason.clone(),
            UploadError::StorageWriteFailed(_) => {
                "Không thể lưu file. Vui lòng thử lại.".to_string()
            }
            UploadError::MetadataWriteFailed(_) | UploadError::CompensatingDeleteFailed(_) => {
                "Không thể lưu thông tin bài học. Vui lòng thử lại.".to_string()
            }
        }
    }

    /// 技术细节（限流没有）
    pub fn cause(&self) -> Option<&str> {
        match self {
            UploadError::RateLimited => None,
            UploadError::ValidationFailed(reason) => Some(reason),
            UploadError::StorageWriteFailed(cause)
            | UploadError::MetadataWriteFailed(cause)
            | UploadError::CompensatingDeleteFailed(cause) => Some(cause),
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cause() {
            Some(cause) => write!(f, "[{}] {}: {}", self.code(), self.user_message(), cause),
            None => write!(f, "[{}] {}", self.code(), self.user_message()),
        }
    }
}

impl std::error::Error for UploadError {}
