//! 存储键生成
//!
//! 原始文件名只用于展示；对象存储中的键由清洗后的文件名、毫秒时间戳和随机令牌组成。

use rand::Rng;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// 清洗后文件名的最大字符数
pub const MAX_SAFE_NAME_LEN: usize = 100;
/// 随机令牌长度
pub const TOKEN_LEN: usize = 6;

const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// 生成只包含 `[A-Za-z0-9._-]` 的文件名
///
/// NFD 分解后去掉组合附加符号，其余不允许的字符替换为 `_`，
/// 连续的 `_` 或 `.` 合并为一个，并去掉首尾的 `_`。结果不含 `..`。
pub fn create_safe_file_name(original_name: &str) -> String {
    let mut safe = String::with_capacity(original_name.len());
    for c in original_name.nfd().filter(|c| !is_combining_mark(*c)) {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '_'
        };
        // 去掉附加符号后两个 `.` 可能相邻
        if matches!(c, '_' | '.') && safe.ends_with(c) {
            continue;
        }
        safe.push(c);
    }

    let trimmed = safe.trim_matches('_');
    let capped: String = trimmed.chars().take(MAX_SAFE_NAME_LEN).collect();
    let capped = capped.trim_end_matches('_');

    if capped.is_empty() {
        "file".to_string()
    } else {
        capped.to_string()
    }
}

/// 生成随机令牌 `[a-z0-9]{6}`
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

/// 组装存储键：`class_<班级>/<时间戳>_<令牌>_<文件名>`
pub fn build_storage_key(
    class_group: i32,
    timestamp_millis: i64,
    token: &str,
    safe_name: &str,
) -> String {
    format!("class_{class_group}/{timestamp_millis}_{token}_{safe_name}")
}

/// 为一次上传生成新的存储键
pub fn derive_storage_key(class_group: i32, original_name: &str) -> String {
    build_storage_key(
        class_group,
        chrono::Utc::now().timestamp_millis(),
        &generate_token(),
        &create_safe_file_name(original_name),
    )
}
