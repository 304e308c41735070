//! 上传文件元数据校验
//!
//! 只看文件名、大小与声明的 MIME 类型，不读取文件内容。
//! 规则按顺序执行，第一条失败的规则决定返回的原因。

use std::collections::BTreeSet;

use crate::config::UploadConfig;

use super::ValidationResult;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_MP4: &str = "video/mp4";
pub const MIME_WEBM: &str = "video/webm";
pub const MIME_OGG: &str = "video/ogg";

/// 文件名中出现即拒绝的扩展名（子串匹配，不仅是后缀）
pub const SUSPICIOUS_EXTENSIONS: &[&str] = &[
    ".exe",
    ".bat",
    ".cmd",
    ".scr",
    ".vbs",
    ".js",
    ".jar",
    ".com",
    ".pif",
    ".application",
    ".gadget",
    ".msi",
    ".msp",
    ".hta",
];

/// 待校验的文件元数据
#[derive(Debug, Clone)]
pub struct FileMeta<'a> {
    pub name: &'a str,
    pub size: u64,
    pub mime_type: &'a str,
}

/// 上传策略
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub allowed_mime_types: BTreeSet<String>,
    pub max_doc_bytes: u64,
    pub max_video_bytes: u64,
    pub max_uploads_per_window: u32,
    pub window_millis: i64,
    pub verify_content_signature: bool,
}

impl UploadPolicy {
    /// 同时接受文档与视频的策略
    pub fn with_videos(mut self) -> Self {
        for mime in [MIME_MP4, MIME_WEBM, MIME_OGG] {
            self.allowed_mime_types.insert(mime.to_string());
        }
        self
    }

    pub fn is_video(mime_type: &str) -> bool {
        mime_type.starts_with("video/")
    }

    /// 该 MIME 类型对应的大小上限
    pub fn max_bytes_for(&self, mime_type: &str) -> u64 {
        if Self::is_video(mime_type) {
            self.max_video_bytes
        } else {
            self.max_doc_bytes
        }
    }

    fn accepted_kinds(&self) -> String {
        let mut kinds: Vec<&str> = self.allowed_mime_types.iter().map(|m| m.as_str()).collect();
        kinds.sort_by_key(|mime| {
            KNOWN_KINDS
                .iter()
                .position(|(m, _)| m == mime)
                .unwrap_or(usize::MAX)
        });
        kinds
            .into_iter()
            .map(mime_label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self {
            allowed_mime_types: config.allowed_mime_types.iter().cloned().collect(),
            max_doc_bytes: config.max_doc_bytes,
            max_video_bytes: config.max_video_bytes,
            max_uploads_per_window: config.max_uploads_per_window,
            window_millis: config.window_millis,
            verify_content_signature: config.verify_content_signature,
        }
    }
}

const KNOWN_KINDS: &[(&str, &str)] = &[
    (MIME_PDF, "PDF"),
    (MIME_DOC, "DOC"),
    (MIME_DOCX, "DOCX"),
    (MIME_MP4, "MP4"),
    (MIME_WEBM, "WEBM"),
    (MIME_OGG, "OGG"),
];

fn mime_label(mime: &str) -> &str {
    KNOWN_KINDS
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, label)| *label)
        .unwrap_or(mime)
}

fn format_megabytes(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb.fract() == 0.0 {
        format!("{}", mb as u64)
    } else {
        format!("{mb:.1}")
    }
}

/// 校验上传文件
pub fn validate_upload(file: &FileMeta<'_>, policy: &UploadPolicy) -> ValidationResult {
    // 1. MIME 白名单
    if !policy.allowed_mime_types.contains(file.mime_type) {
        return ValidationResult::invalid(format!(
            "Loại file không được phép. Chỉ chấp nhận {}.",
            policy.accepted_kinds()
        ));
    }

    // 2. 按类型区分的大小上限，恰好等于上限时通过
    let max_size = policy.max_bytes_for(file.mime_type);
    if file.size > max_size {
        return ValidationResult::invalid(format!(
            "File quá lớn (tối đa {}MB)",
            format_megabytes(max_size)
        ));
    }

    // 3. 危险扩展名（出现在文件名任意位置即拒绝）
    let file_name = file.name.to_lowercase();
    if SUSPICIOUS_EXTENSIONS
        .iter()
        .any(|pattern| file_name.contains(pattern))
    {
        return ValidationResult::invalid("Tên file chứa phần mở rộng không được phép");
    }

    // 4. 空字节与路径穿越
    if file_name.contains('\0') || file_name.contains("..") {
        return ValidationResult::invalid("Tên file chứa ký tự không hợp lệ");
    }

    ValidationResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn meta<'a>(name: &'a str, size: u64, mime_type: &'a str) -> FileMeta<'a> {
        FileMeta {
            name,
            size,
            mime_type,
        }
    }

    #[test]
    fn test_accepts_documents() {
        let policy = UploadPolicy::default();
        assert!(validate_upload(&meta("bai.pdf", MB, MIME_PDF), &policy).valid);
        assert!(validate_upload(&meta("bai.doc", MB, MIME_DOC), &policy).valid);
        assert!(validate_upload(&meta("bai.docx", MB, MIME_DOCX), &policy).valid);
    }

    #[test]
    fn test_rejects_unlisted_type_regardless_of_name_and_size() {
        let policy = UploadPolicy::default();
        for (name, size) in [("a.pdf", 0), ("safe.docx", MB), ("x.exe", 999 * MB)] {
            let result = validate_upload(&meta(name, size, "application/zip"), &policy);
            assert!(!result.valid);
            assert!(
                result
                    .error
                    .as_deref()
                    .is_some_and(|e| e.starts_with("Loại file không được phép"))
            );
        }
        // 默认策略不接受视频
        assert!(!validate_upload(&meta("v.mp4", MB, MIME_MP4), &policy).valid);
    }

    #[test]
    fn test_size_boundary() {
        let policy = UploadPolicy::default();
        let at_limit = meta("bai.pdf", policy.max_doc_bytes, MIME_PDF);
        assert!(validate_upload(&at_limit, &policy).valid);

        let over = meta("bai.pdf", policy.max_doc_bytes + 1, MIME_PDF);
        let result = validate_upload(&over, &policy);
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("File quá lớn (tối đa 10MB)"));
    }

    #[test]
    fn test_video_ceiling() {
        let policy = UploadPolicy::default().with_videos();
        assert!(validate_upload(&meta("lop1.mp4", 400 * MB, MIME_MP4), &policy).valid);
        assert!(validate_upload(&meta("lop1.webm", 500 * MB, MIME_WEBM), &policy).valid);
        let result = validate_upload(&meta("lop1.ogg", 500 * MB + 1, MIME_OGG), &policy);
        assert_eq!(result.error.as_deref(), Some("File quá lớn (tối đa 500MB)"));
    }

    #[test]
    fn test_suspicious_extension_anywhere_in_name() {
        let policy = UploadPolicy::default();
        for name in ["my.js.report.pdf", "SETUP.EXE.pdf", "a.com.docx", "x.hta"] {
            let result = validate_upload(&meta(name, MB, MIME_PDF), &policy);
            assert_eq!(
                result.error.as_deref(),
                Some("Tên file chứa phần mở rộng không được phép"),
                "name: {name}"
            );
        }
        // json 中包含 ".js"
        assert!(!validate_upload(&meta("data.json.pdf", MB, MIME_PDF), &policy).valid);
    }

    #[test]
    fn test_traversal_and_null_byte() {
        let policy = UploadPolicy::default();
        for name in ["../etc/passwd.pdf", "a..b.pdf", "bai\0.pdf"] {
            let result = validate_upload(&meta(name, MB, MIME_PDF), &policy);
            assert_eq!(
                result.error.as_deref(),
                Some("Tên file chứa ký tự không hợp lệ"),
                "name: {name:?}"
            );
        }
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let policy = UploadPolicy::default();
        // 超大且含危险扩展名：大小规则先触发
        let result = validate_upload(&meta("x.exe.pdf", 20 * MB, MIME_PDF), &policy);
        assert!(result.error.as_deref().is_some_and(|e| e.starts_with("File quá lớn")));
    }

    #[test]
    fn test_type_message_lists_kinds() {
        let policy = UploadPolicy::default();
        let result = validate_upload(&meta("a.txt", 1, "text/plain"), &policy);
        assert_eq!(
            result.error.as_deref(),
            Some("Loại file không được phép. Chỉ chấp nhận PDF, DOC, DOCX.")
        );
    }
}
