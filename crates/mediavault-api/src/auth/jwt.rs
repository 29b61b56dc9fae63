//! Bearer-token issuance and validation (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mediavault_core::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's email.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

pub fn create_token(email: &str, secret: &str, expiry_minutes: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        exp: (now + Duration::minutes(expiry_minutes)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Could not validate credentials".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_round_trip() {
        let token = create_token("a@b.com", SECRET, 60).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "a@b.com");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token("a@b.com", SECRET, 60).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_rejected() {
        let token = create_token("a@b.com", SECRET, -5).unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify_token("not.a.token", SECRET).is_err());
    }
}
