use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 业务错误码
///
/// 0 表示成功；1xxx 通用错误，2xxx 认证与用户，3xxx 课程成果与上传。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../bindings/api.ts")]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    AuthFailed = 2000,
    UserNotFound = 2001,
    UserAlreadyExists = 2002,
    UserNameInvalid = 2003,
    UserPasswordInvalid = 2004,
    UserCreationFailed = 2005,
    UserInactive = 2006,

    LessonNotFound = 3000,
    LessonPermissionDenied = 3001,
    LessonDeleteFailed = 3002,
    FileUploadFailed = 3100,
    FileTypeNotAllowed = 3101,
    FileSizeExceeded = 3102,
    FileNotFound = 3103,
    MultifileUploadNotAllowed = 3104,
    LessonValidationFailed = 3105,
}
