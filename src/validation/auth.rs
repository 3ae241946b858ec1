use crate::error::{AppError, Result};

/// Validates a login.
///
/// # Arguments
///
/// * `login` - The login to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the login is valid.
pub fn validate_login(login: &str) -> Result<()> {
    let length = login.chars().count();

    if length < 3 {
        return Err(AppError::Validation(
            "Login must be at least 3 characters long".to_string(),
        ));
    }

    if length > 255 {
        return Err(AppError::Validation(
            "Login must be at most 255 characters".to_string(),
        ));
    }

    if !login.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(AppError::Validation(
            "Login can only contain letters, numbers, underscores, and hyphens".to_string(),
        ));
    }

    Ok(())
}

/// Validates a password.
///
/// # Arguments
///
/// * `password` - The password to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the password is valid.
pub fn validate_password(password: &str) -> Result<()> {
    let length = password.chars().count();

    if length < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if length > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates an optional display name.
pub fn validate_display_name(name: &str) -> Result<()> {
    if name.chars().count() > 255 {
        return Err(AppError::Validation(
            "Name must be at most 255 characters".to_string(),
        ));
    }

    if name.chars().any(char::is_control) {
        return Err(AppError::Validation(
            "Name cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_rules() {
        assert!(validate_login("admin").is_ok());
        assert!(validate_login("user_01-b").is_ok());
        assert!(validate_login("ab").is_err());
        assert!(validate_login("has space").is_err());
        assert!(validate_login("1' or '1'='1").is_err());
        assert!(validate_login(&"x".repeat(256)).is_err());
    }

    #[test]
    fn login_length_counts_characters() {
        assert!(validate_login("ЖЖ").is_err());
        assert!(validate_login("ЖЖЖ").is_ok());
        assert!(validate_login(&"Ж".repeat(200)).is_ok());
        assert!(validate_login(&"Ж".repeat(255)).is_ok());
        assert!(validate_login(&"Ж".repeat(256)).is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(129)).is_err());
        assert!(validate_password(&"пароль".repeat(20)).is_ok());
    }

    #[test]
    fn display_name_rules() {
        assert!(validate_display_name("").is_ok());
        assert!(validate_display_name("Lorem Ipsum").is_ok());
        assert!(validate_display_name("bad\nname").is_err());
        assert!(validate_display_name(&"n".repeat(256)).is_err());
    }
}
