//! Password hashing (bcrypt).

use mediavault_core::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed: &str) -> bool {
    bcrypt::verify(password, hashed).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hashed));
        assert!(!verify_password("hunter3!", &hashed));
    }

    #[test]
    fn test_verify_bad_hash_is_false() {
        assert!(!verify_password("x", "not-a-bcrypt-hash"));
    }
}
