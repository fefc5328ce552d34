use crate::error::{AppError, AppResult};
use bcrypt::{hash, verify};

const MIN_PASSWORD_CHARS: usize = 8;
const MAX_PASSWORD_CHARS: usize = 128;

/// Strength rule for administrator passwords: 8 to 128 characters with at
/// least one upper-case letter, one lower-case letter and one digit.
pub fn validate_password(password: &str) -> AppResult<()> {
    let length = password.chars().count();
    if !(MIN_PASSWORD_CHARS..=MAX_PASSWORD_CHARS).contains(&length) {
        return Err(AppError::ValidationError(format!(
            "Password must be between {MIN_PASSWORD_CHARS} and {MAX_PASSWORD_CHARS} characters"
        )));
    }

    let missing: Vec<&str> = [
        (password.chars().any(char::is_uppercase), "an upper-case letter"),
        (password.chars().any(char::is_lowercase), "a lower-case letter"),
        (password.chars().any(|c| c.is_ascii_digit()), "a digit"),
    ]
    .into_iter()
    .filter_map(|(present, label)| (!present).then_some(label))
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "Password must contain {}",
            missing.join(", ")
        )))
    }
}

pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    hash(password, cost)
        .map_err(|e| AppError::InternalError(format!("password hashing failed: {e}")))
}

/// A malformed stored hash is an internal error, not a failed login.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("password verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_password_rules() {
        assert!(validate_password("Seva2024Pass").is_ok());
        assert!(validate_password("Sv1").is_err());
        assert!(validate_password(&format!("Aa1{}", "x".repeat(130))).is_err());

        match validate_password("templeadmin") {
            Err(AppError::ValidationError(msg)) => {
                assert!(msg.contains("upper-case"));
                assert!(msg.contains("digit"));
                assert!(!msg.contains("lower-case"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_hash_then_verify() {
        let hashed = hash_password("Seva2024Pass", 4).unwrap();
        assert!(verify_password("Seva2024Pass", &hashed).unwrap());
        assert!(!verify_password("seva2024pass", &hashed).unwrap());
        assert!(verify_password("Seva2024Pass", "not-a-bcrypt-hash").is_err());
    }
}
