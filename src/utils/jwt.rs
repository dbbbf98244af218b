use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // user_id
    pub email: String,
    pub exp: i64, // expiration timestamp
}

/// Génère un JWT token pour un utilisateur
pub fn generate_token(
    user_id: i32,
    email: &str,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Vérifie et décode un JWT token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_generate_and_verify_token() {
        let token = generate_token(123, "cook@example.com", SECRET, 24).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, 123);
        assert_eq!(claims.email, "cook@example.com");
    }

    #[test]
    fn test_invalid_token() {
        assert!(verify_token("invalid.token.here", SECRET).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_token(1, "a@b.c", SECRET, 24).unwrap();
        assert!(verify_token(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // exp bien en dehors de la marge par défaut (60s)
        let token = generate_token(1, "a@b.c", SECRET, -2).unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }
}
