//! 自由文本清洗与校验

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationResult;

/// 清洗后文本的默认最大字符数
pub const DEFAULT_TEXT_LIMIT: usize = 255;

static UNSAFE_SCHEME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)javascript:|data:|vbscript:").expect("Invalid unsafe scheme regex")
});

static SUSPICIOUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(union|select|insert|update|delete|drop|exec|script|alert|eval|expression)",
        r"(?i)<script[\s\S]*?>[\s\S]*?</script>",
        r"(?i)javascript:",
        r"(?i)data:text/html",
        r"(?i)vbscript:",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid suspicious pattern regex"))
    .collect()
});

/// 去掉 HTML 注入字符与危险 URI scheme，不截断
///
/// scheme 的删除会重复到不再变化为止（如 `javajavascript:script:`），
/// 首尾空白在删除之后再裁剪，保证结果再次清洗不会改变。
pub fn strip_unsafe(input: &str) -> String {
    let mut text: String = input
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '\'' | '"'))
        .collect();

    loop {
        let replaced = UNSAFE_SCHEME_RE.replace_all(&text, "");
        if replaced.len() == text.len() {
            break;
        }
        text = replaced.into_owned();
    }

    text.trim().to_string()
}

/// 清洗用户输入：去除注入字符和危险 scheme，并截断到 255 个字符
pub fn sanitize_text(input: &str) -> String {
    sanitize_text_with_limit(input, DEFAULT_TEXT_LIMIT)
}

/// 同 [`sanitize_text`]，但可指定最大字符数
pub fn sanitize_text_with_limit(input: &str, max_chars: usize) -> String {
    let cleaned = strip_unsafe(input);
    if cleaned.chars().count() <= max_chars {
        return cleaned;
    }
    let truncated: String = cleaned.chars().take(max_chars).collect();
    truncated.trim_end().to_string()
}

/// 校验文本：非空、长度、可疑模式
///
/// 这是纵深防御的启发式检查，不能替代存储层的参数化查询。
pub fn validate_text(input: &str, max_length: usize) -> ValidationResult {
    if input.trim().is_empty() {
        return ValidationResult::invalid("Trường này không được để trống");
    }

    if input.chars().count() > max_length {
        return ValidationResult::invalid(format!("Không được vượt quá {max_length} ký tự"));
    }

    if SUSPICIOUS_PATTERNS.iter().any(|re| re.is_match(input)) {
        return ValidationResult::invalid("Dữ liệu đầu vào chứa nội dung không được phép");
    }

    ValidationResult::ok()
}
