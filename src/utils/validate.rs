use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationResult;

static USER_NO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid user_no regex"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

/// 邮箱最大长度
pub const MAX_EMAIL_LEN: usize = 254;

/// 校验登录账号
pub fn validate_username(user_no: &str) -> Result<(), &'static str> {
    // 账号长度校验：5 <= x <= 32
    if user_no.len() < 5 || user_no.len() > 32 {
        return Err("Tên đăng nhập phải có từ 5 đến 32 ký tự");
    }
    // 账号格式校验：只能包含字母、数字、下划线或连字符
    if !USER_NO_RE.is_match(user_no) {
        return Err("Tên đăng nhập chỉ được chứa chữ cái, số, dấu gạch dưới hoặc gạch ngang");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}

/// 验证密码是否符合安全策略
///
/// 策略要求：
/// - 最小长度：8 字符
/// - 必须包含：小写字母 + 大写字母 + 数字
pub fn validate_password(password: &str) -> ValidationResult {
    if password.chars().count() < 8 {
        return ValidationResult::invalid("Mật khẩu phải có ít nhất 8 ký tự");
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return ValidationResult::invalid(
            "Mật khẩu phải chứa ít nhất một chữ cái thường, một chữ cái hoa và một số",
        );
    }

    ValidationResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").valid);
        assert!(validate_password("GiaoVien2024").valid);
    }

    #[test]
    fn test_short_password() {
        let result = validate_password("Ab1");
        assert_eq!(
            result.error.as_deref(),
            Some("Mật khẩu phải có ít nhất 8 ký tự")
        );
    }

    #[test]
    fn test_missing_character_class() {
        for password in ["abcd1234", "ABCD1234", "AbcdEfgh"] {
            let result = validate_password(password);
            assert!(!result.valid, "{password}");
            assert!(
                result
                    .error
                    .as_deref()
                    .is_some_and(|e| e.starts_with("Mật khẩu phải chứa"))
            );
        }
    }

    #[test]
    fn test_email() {
        assert!(validate_email("gv.lan@truong.edu.vn"));
        assert!(!validate_email("no-at-sign.vn"));
        assert!(!validate_email("a b@c.vn"));
        assert!(!validate_email("a@b"));
        let long = format!("{}@x.vn", "a".repeat(250));
        assert!(!validate_email(&long));
    }

    #[test]
    fn test_username() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("gv_007").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("giáo viên").is_err());
    }
}
