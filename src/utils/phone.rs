use crate::error::{AppError, AppResult};
use regex::Regex;

/// Indian mobile number: ten digits starting with 6-9.
pub fn validate_indian_phone(phone: &str) -> AppResult<()> {
    let phone_regex = Regex::new(r"^[6-9]\d{9}$")
        .map_err(|e| AppError::InternalError(format!("phone pattern: {e}")))?;

    if !phone_regex.is_match(phone) {
        return Err(AppError::ValidationError(
            "Please provide a valid 10-digit Indian phone number".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    let email_regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map_err(|e| AppError::InternalError(format!("email pattern: {e}")))?;

    if !email_regex.is_match(email) {
        return Err(AppError::ValidationError(
            "Please provide a valid email address".to_string(),
        ));
    }

    Ok(())
}

/// Trim and lower-case before storing or comparing.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_indian_phone() {
        assert!(validate_indian_phone("9876543210").is_ok());
        assert!(validate_indian_phone("6000000000").is_ok());
        assert!(validate_indian_phone("5876543210").is_err());
        assert!(validate_indian_phone("987654321").is_err());
        assert!(validate_indian_phone("98765432101").is_err());
        assert!(validate_indian_phone("+919876543210").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("devotee@example.org").is_ok());
        assert!(validate_email("no-at-sign.org").is_err());
        assert!(validate_email("a b@example.org").is_err());
        assert!(validate_email("user@localhost").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Devotee@Example.ORG "), "devotee@example.org");
    }
}
