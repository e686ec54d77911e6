use rand::Rng;
use rand::distr::Alphanumeric;

/// 生成由大小写字母和数字组成的随机字符串
pub fn generate_random_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// 生成随机密码，保证包含大小写字母与数字
pub fn generate_random_password(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    loop {
        let password: String = (0..length)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();

        if password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_lowercase())
            && password.chars().any(|c| c.is_ascii_digit())
        {
            return password;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_shape() {
        let code = generate_random_code(32);
        assert_eq!(code.len(), 32);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(code, generate_random_code(32));
    }

    #[test]
    fn test_random_password_satisfies_policy() {
        let password = generate_random_password(16);
        assert_eq!(password.len(), 16);
        assert!(crate::utils::validate::validate_password(&password).is_valid);
    }
}
