use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 验证密码是否符合安全策略
///
/// 策略要求：
/// - 最小长度：8 字符
/// - 必须包含：大写字母 + 小写字母 + 数字
/// - 可选：特殊字符（增强安全性）
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    // 1. 长度检查：至少 8 个字符
    if password.len() < 8 {
        errors.push("Password must be at least 8 characters long");
    }

    // 2. 大写字母检查
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }

    // 3. 小写字母检查
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }

    // 4. 数字检查
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    // 5. 常见弱密码检查
    let weak_passwords = [
        "password",
        "12345678",
        "123456789",
        "qwerty123",
        "admin123",
        "password1",
        "Password1",
        "Qwerty123",
        "Abcd1234",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// 规范化邮箱：去除首尾空白并转为小写
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 解析成绩，必须为 [0, 100] 区间内的有限数值
pub fn parse_grade(input: &str) -> Result<f64, &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Grade is required");
    }
    let grade: f64 = trimmed.parse().map_err(|_| "Grade must be a number")?;
    if !grade.is_finite() || !(0.0..=100.0).contains(&grade) {
        return Err("Grade must be between 0 and 100");
    }
    Ok(grade)
}

/// 登录后跳转地址，只接受以单个 `/` 开头的本地路径
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        Some(next)
    } else {
        None
    }
}

/// 简化的密码验证（返回 Result）
pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let result = validate_password(password);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.error_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").is_valid);
        assert!(validate_password("MyP@ssw0rd").is_valid);
        assert!(validate_password("SecurePass123").is_valid);
    }

    #[test]
    fn test_short_password() {
        let result = validate_password("Ab1");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must be at least 8 characters long")
        );
    }

    #[test]
    fn test_no_uppercase() {
        let result = validate_password("abcd1234");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one uppercase letter")
        );
    }

    #[test]
    fn test_no_lowercase() {
        let result = validate_password("ABCD1234");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one lowercase letter")
        );
    }

    #[test]
    fn test_no_digit() {
        let result = validate_password("AbcdEfgh");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one digit")
        );
    }

    #[test]
    fn test_email_format() {
        assert!(validate_email("student@example.com").is_ok());
        assert!(validate_email("first.last+tag@uni.edu.cn").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_parse_grade_accepts_bounds() {
        assert_eq!(parse_grade("0"), Ok(0.0));
        assert_eq!(parse_grade("100"), Ok(100.0));
        assert_eq!(parse_grade(" 85.5 "), Ok(85.5));
    }

    #[test]
    fn test_parse_grade_rejects_invalid() {
        assert_eq!(parse_grade(""), Err("Grade is required"));
        assert_eq!(parse_grade("   "), Err("Grade is required"));
        assert_eq!(parse_grade("A+"), Err("Grade must be a number"));
        assert_eq!(parse_grade("-0.5"), Err("Grade must be between 0 and 100"));
        assert_eq!(parse_grade("100.01"), Err("Grade must be between 0 and 100"));
        assert_eq!(parse_grade("NaN"), Err("Grade must be between 0 and 100"));
        assert_eq!(parse_grade("inf"), Err("Grade must be between 0 and 100"));
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/courses/3")), Some("/courses/3"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn test_common_password() {
        let result = validate_password("Password1");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password is too common, please choose a stronger password")
        );
    }
}
